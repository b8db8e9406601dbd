/*
Rendering of the decision tree for terminals via termtree.

Questions are labelled with a trailing '?', every child is prefixed with the
answer that leads to it.
 */
use termtree::Tree;
use tracing::instrument;

use crate::domain::node::NodeId;
use crate::domain::tree::KnowledgeBase;

pub trait TreeDisplay {
    fn to_tree(&self) -> Tree<String>;
}

impl TreeDisplay for KnowledgeBase {
    #[instrument(level = "debug", skip(self))]
    fn to_tree(&self) -> Tree<String> {
        fn label(kb: &KnowledgeBase, id: NodeId, answer: Option<&str>) -> String {
            let text = kb.text(id);
            let text = if kb.is_leaf(id) {
                text.to_string()
            } else {
                format!("{text}?")
            };
            match answer {
                Some(answer) => format!("{answer}: {text}"),
                None => text,
            }
        }

        enum Step {
            Enter(NodeId, Option<&'static str>),
            Join(NodeId, Option<&'static str>),
        }

        // subtrees are built bottom-up on `done`, children before their question
        let mut done: Vec<Tree<String>> = Vec::new();
        let mut stack = vec![Step::Enter(self.root(), None)];
        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(id, answer) => match self.children(id) {
                    None => done.push(Tree::new(label(self, id, answer))),
                    Some((yes, no)) => {
                        stack.push(Step::Join(id, answer));
                        stack.push(Step::Enter(no, Some("no")));
                        stack.push(Step::Enter(yes, Some("yes")));
                    }
                },
                Step::Join(id, answer) => {
                    let mut tree = Tree::new(label(self, id, answer));
                    if let (Some(no), Some(yes)) = (done.pop(), done.pop()) {
                        tree.push(yes);
                        tree.push(no);
                    }
                    done.push(tree);
                }
            }
        }

        done.pop().unwrap_or_else(|| Tree::new(label(self, self.root(), None)))
    }
}
