// Deterministic finite-state transcriber: rewrites the longest matching
// left-hand side of any rule with its right-hand side, leftmost first,
// non-overlapping, copying everything else through unchanged.
//
// Rules are compiled directly against code-point sequences rather than a
// byte-view over a wide-character buffer, so there's no byte/code-point
// adapter layer to get wrong. The trie itself keeps a sparse,
// ownership-by-parent shape (`keys`/`children` in lock-step, rather than
// a fixed-width array).

use log::warn;

struct Node {
    keys: Vec<u32>,
    children: Vec<Node>,
    replacement: Option<Vec<u32>>,
}

impl Node {
    fn empty() -> Self {
        Node {
            keys: Vec::new(),
            children: Vec::new(),
            replacement: None,
        }
    }

    fn child_mut(&mut self, key: u32) -> &mut Node {
        if let Some(idx) = self.keys.iter().position(|k| *k == key) {
            &mut self.children[idx]
        } else {
            self.keys.push(key);
            self.children.push(Node::empty());
            self.children.last_mut().unwrap()
        }
    }

    fn child(&self, key: u32) -> Option<&Node> {
        self.keys
            .iter()
            .position(|k| *k == key)
            .map(|idx| &self.children[idx])
    }
}

/// A single `left right` rule as read from a transcription file.
pub struct Rule {
    pub left: Vec<u32>,
    pub right: Vec<u32>,
}

pub struct Transcriber {
    root: Node,
    empty: bool,
}

impl Transcriber {
    /// An empty transcriber: `apply` is the identity.
    pub fn empty() -> Self {
        Transcriber {
            root: Node::empty(),
            empty: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn build(rules: Vec<Rule>) -> Self {
        let mut t = Transcriber::empty();
        for rule in rules {
            t.add_rule(rule.left, rule.right);
        }
        t
    }

    fn add_rule(&mut self, left: Vec<u32>, right: Vec<u32>) {
        self.empty = false;
        let mut node = &mut self.root;
        for cp in &left {
            node = node.child_mut(*cp);
        }
        if node.replacement.is_some() {
            warn!(
                "transcription conflict: rule for {:?} already present, keeping first",
                left
            );
            return;
        }
        node.replacement = Some(right);
    }

    /// Rewrite every non-overlapping, leftmost, longest occurrence of any
    /// rule's left-hand side in `input` with its right-hand side.
    pub fn apply(&self, input: &[u32]) -> Vec<u32> {
        if self.empty || input.is_empty() {
            return input.to_vec();
        }
        let mut out = Vec::with_capacity(input.len());
        let mut node = &self.root;
        let mut r = 0usize; // retreat cursor: start of the unresolved run
        let mut f = 0usize; // forward cursor: scan position
        while f < input.len() {
            match node.child(input[f]) {
                Some(next) => {
                    node = next;
                    f += 1;
                }
                None => {
                    if let Some(replacement) = &node.replacement {
                        out.extend_from_slice(replacement);
                        r = f;
                        node = &self.root;
                    } else {
                        out.push(input[r]);
                        r += 1;
                        f = r;
                        node = &self.root;
                    }
                }
            }
        }
        // close loose ends
        if let Some(replacement) = &node.replacement {
            out.extend_from_slice(replacement);
        } else {
            out.extend_from_slice(&input[r..f]);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(left: &str, right: &str) -> Rule {
        Rule {
            left: left.chars().map(|c| c as u32).collect(),
            right: right.chars().map(|c| c as u32).collect(),
        }
    }

    fn cps(s: &str) -> Vec<u32> {
        s.chars().map(|c| c as u32).collect()
    }

    #[test]
    fn test_passthrough_on_empty_ruleset() {
        let t = Transcriber::empty();
        assert_eq!(t.apply(&cps("phone")), cps("phone"));
    }

    #[test]
    fn test_simple_rule() {
        let t = Transcriber::build(vec![rule("ph", "f")]);
        assert_eq!(t.apply(&cps("phone")), cps("fone"));
    }

    #[test]
    fn test_longest_match_wins() {
        // rules `a -> x` and `ab -> y`; "abc" should become "yc", not "xbc".
        let t = Transcriber::build(vec![rule("a", "x"), rule("ab", "y")]);
        assert_eq!(t.apply(&cps("abc")), cps("yc"));
    }

    #[test]
    fn test_non_overlapping() {
        let t = Transcriber::build(vec![rule("aa", "b")]);
        assert_eq!(t.apply(&cps("aaaa")), cps("bb"));
    }

    #[test]
    fn test_conflict_keeps_first() {
        let mut t = Transcriber::empty();
        t.add_rule(cps("ay"), cps("ai"));
        t.add_rule(cps("ay"), cps("ae"));
        assert_eq!(t.apply(&cps("ay")), cps("ai"));
    }
}
