//! KeywordTree: a pure parent-index arena of interned
//! dotted-prefix nodes, shared across FPS instances when prefixes match.
//! No back-pointers beyond `parent_index`.

use std::collections::HashMap;

use crate::limits::NB_KEYWNODE_MAX;

/// One node in the tree: a path prefix, shared across FPS instances.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordNode {
    pub keyword_segments: Vec<String>,
    pub parent_index: Option<usize>,
    pub children: Vec<usize>,
    pub is_leaf: bool,
    /// Set only on leaf nodes: which FPS/parameter this prefix resolves to.
    pub fps_index: Option<usize>,
    pub param_index: Option<usize>,
}

impl KeywordNode {
    fn full(&self) -> String {
        self.keyword_segments.join(".")
    }
}

/// Overflow of the fixed-capacity node arena: a programming error, not a
/// user error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("keyword tree node arena exhausted (NB_KEYWNODE_MAX = {NB_KEYWNODE_MAX})")]
pub struct KeywordTreeOverflow;

/// Parent-index arena of interned keyword-path prefixes.
#[derive(Debug, Clone, Default)]
pub struct KeywordTree {
    nodes: Vec<KeywordNode>,
    index_by_full: HashMap<String, usize>,
}

impl KeywordTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[KeywordNode] {
        &self.nodes
    }

    pub fn find(&self, full: &str) -> Option<&KeywordNode> {
        self.index_by_full.get(full).map(|&i| &self.nodes[i])
    }

    /// Intern every prefix of `segments` as a tree node (root -> seg1 ->
    /// seg1.seg2 -> ...), marking the full path as a leaf bound to
    /// `(fps_index, param_index)`.
    pub fn intern(
        &mut self,
        segments: &[String],
        fps_index: usize,
        param_index: usize,
    ) -> Result<(), KeywordTreeOverflow> {
        let mut parent: Option<usize> = None;
        let mut prefix: Vec<String> = Vec::with_capacity(segments.len());

        for (depth, seg) in segments.iter().enumerate() {
            prefix.push(seg.clone());
            let full = prefix.join(".");
            let is_leaf = depth == segments.len() - 1;

            let node_idx = if let Some(&existing) = self.index_by_full.get(&full) {
                existing
            } else {
                if self.nodes.len() >= NB_KEYWNODE_MAX {
                    return Err(KeywordTreeOverflow);
                }
                let idx = self.nodes.len();
                self.nodes.push(KeywordNode {
                    keyword_segments: prefix.clone(),
                    parent_index: parent,
                    children: Vec::new(),
                    is_leaf: false,
                    fps_index: None,
                    param_index: None,
                });
                self.index_by_full.insert(full, idx);
                if let Some(p) = parent {
                    self.nodes[p].children.push(idx);
                }
                idx
            };

            if is_leaf {
                let node = &mut self.nodes[node_idx];
                node.is_leaf = true;
                node.fps_index = Some(fps_index);
                node.param_index = Some(param_index);
            }

            parent = Some(node_idx);
        }

        Ok(())
    }

    /// Resolve a fully-qualified `<fps_name>.<seg>...<seg>` path to its
    /// `(fps_index, param_index)`, for CommandInterpreter dispatch.
    pub fn resolve(&self, full_path: &str) -> Option<(usize, usize)> {
        let node = self.find(full_path)?;
        if !node.is_leaf {
            return None;
        }
        Some((node.fps_index?, node.param_index?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_prefixes_are_not_duplicated() {
        let mut tree = KeywordTree::new();
        tree.intern(&["conf".into(), "delay".into()], 0, 0).unwrap();
        tree.intern(&["conf".into(), "gain".into()], 0, 1).unwrap();

        assert!(tree.find("conf").is_some());
        assert_eq!(tree.nodes().len(), 3); // conf, conf.delay, conf.gain
        assert_eq!(tree.resolve("conf.delay"), Some((0, 0)));
        assert_eq!(tree.resolve("conf.gain"), Some((0, 1)));
        assert_eq!(tree.resolve("conf"), None); // not a leaf
    }
}
