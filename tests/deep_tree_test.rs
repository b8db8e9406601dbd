//! Trees grown far deeper than any hand-written document
//!
//! Each test runs on the default test thread stack, so every walk over the
//! decision tree has to keep its own stack.

use pretty_assertions::assert_eq;

use guesstree::domain::{CodecOptions, KnowledgeBase, TreeDisplay};

/// Chain of `depth` questions, each asked on the "no" side of the previous one.
fn learned_chain(depth: usize) -> KnowledgeBase {
    let mut kb = KnowledgeBase::new("bottom").unwrap();
    {
        let mut cursor = kb.cursor();
        for i in 0..depth {
            // scattered names keep the leaf index shallow
            let name = format!("s{:08x}", (i as u32).wrapping_mul(2_654_435_761));
            cursor.learn(&format!("q{i}"), &name).unwrap();
            cursor.advance(false);
        }
    }
    kb
}

fn compact() -> CodecOptions {
    CodecOptions {
        compact: true,
        ..CodecOptions::default()
    }
}

#[test]
fn given_learned_chain_beyond_former_limit_when_saving_and_loading_then_round_trips() {
    // Arrange
    let kb = learned_chain(1_500);
    let options = CodecOptions {
        indent: 1,
        ..CodecOptions::default()
    };

    // Act
    let text = kb.to_text(&options);
    let again = KnowledgeBase::parse_with(&text, Default::default(), &options).unwrap();

    // Assert
    assert_eq!(again.tree_size(), 3_001);
    assert_eq!(again.leaf_count(), 1_501);
    assert_eq!(again.depth(), 1_501);
    assert_eq!(again.to_text(&options), text);
}

#[test]
fn given_very_deep_chain_when_round_tripping_compact_text_then_identical() {
    let kb = learned_chain(20_000);

    let text = kb.to_text(&compact());
    let again = KnowledgeBase::parse(&text).unwrap();

    assert_eq!(again.tree_size(), kb.tree_size());
    assert_eq!(again.depth(), 20_001);
    assert_eq!(again.to_text(&compact()), text);
    assert!(again.contains("bottom"));
    assert_eq!(again.define("bottom").unwrap().into_properties().len(), 20_000);
}

#[test]
fn given_very_deep_chain_when_dumping_graph_then_every_node_and_edge_written() {
    let depth = 20_000;
    let kb = learned_chain(depth);

    let graph = kb.to_graph();

    let lines: Vec<&str> = graph.lines().collect();
    // header, 2n+1 nodes, 2n edges, footer
    assert_eq!(lines.len(), 4 * depth + 3);
    assert_eq!(lines[1], "    node1 [label = \"q0?\"];");
    assert_eq!(lines[lines.len() - 3], "    node1 -> node2 [label = \"yes\"];");
    assert_eq!(lines[lines.len() - 2], "    node1 -> node3 [label = \"no\"];");
    assert_eq!(lines[lines.len() - 1], "}");
}

#[test]
fn given_deep_chain_when_rendering_tree_then_every_level_present() {
    let depth = 2_000;
    let kb = learned_chain(depth);

    let tree = kb.to_tree();

    let mut node = &tree;
    let mut levels = 1;
    while let [yes, no] = node.leaves.as_slice() {
        assert!(yes.root.starts_with("yes: s"), "yes label: {}", yes.root);
        node = no;
        levels += 1;
    }
    assert_eq!(levels, depth + 1);
    assert_eq!(node.root, "no: bottom");
}
