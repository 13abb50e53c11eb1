//! Resolves negated groups with De Morgan's law so that only leaves carry negation.

use crate::logic::{LogicTree, Member, Negate};
use crate::types::{Group, SearchToken};

impl Negate for SearchToken {
    /// Leaves toggle their flag. Groups are expected to be normalized already,
    /// so the flip descends into them instead of stacking another flag.
    fn negate(self) -> Self {
        match self {
            SearchToken::Group(group) => SearchToken::Group(Group {
                tree: group.tree.negate(),
                negated: group.negated,
            }),
            mut leaf => {
                leaf.toggle_negation();
                leaf
            }
        }
    }
}

impl SearchToken {
    pub fn normalize(self) -> Self {
        match self {
            SearchToken::Group(group) => {
                let tree = group.tree.normalize();
                SearchToken::Group(Group {
                    tree: if group.negated { tree.negate() } else { tree },
                    negated: false,
                })
            }
            leaf => leaf,
        }
    }
}

impl LogicTree<SearchToken> {
    /// Bottom-up: inner groups are resolved before an outer negation descends into them.
    pub fn normalize(self) -> Self {
        LogicTree {
            connective: self.connective,
            members: self
                .members
                .into_iter()
                .map(|member| match member {
                    Member::Single(token) => Member::Single(token.normalize()),
                    Member::Bundle(tokens) => {
                        Member::Bundle(tokens.into_iter().map(SearchToken::normalize).collect())
                    }
                })
                .collect(),
        }
    }

    /// True when no group in the tree still carries a negation flag.
    pub fn is_normalized(&self) -> bool {
        self.members.iter().all(|member| match member {
            Member::Single(token) => token_is_normalized(token),
            Member::Bundle(tokens) => tokens.iter().all(token_is_normalized),
        })
    }
}

fn token_is_normalized(token: &SearchToken) -> bool {
    match token {
        SearchToken::Group(group) => !group.negated && group.tree.is_normalized(),
        _ => true,
    }
}
