use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Connective {
    And,
    Or,
}

impl Connective {
    pub fn flipped(self) -> Self {
        match self {
            Connective::And => Connective::Or,
            Connective::Or => Connective::And,
        }
    }
}

/// A tree member. A bundle is joined by the opposite connective of its tree:
/// an AND run inside an OR tree, or (after a De Morgan flip) an OR run inside an AND tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Member<T> {
    Single(T),
    Bundle(Vec<T>),
}

/// Two-level OR-of-AND tree as built by [`LogicAccumulator`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogicTree<T> {
    pub connective: Connective,
    pub members: Vec<Member<T>>,
}

impl<T> LogicTree<T> {
    /// Connective joining the items of a [`Member::Bundle`].
    pub fn bundle_connective(&self) -> Connective {
        self.connective.flipped()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

pub trait Negate {
    fn negate(self) -> Self;
}

impl<T: Negate> Negate for LogicTree<T> {
    /// De Morgan: flip the connective and negate every member.
    /// Bundles keep the opposite connective, so they flip along with the tree.
    fn negate(self) -> Self {
        LogicTree {
            connective: self.connective.flipped(),
            members: self
                .members
                .into_iter()
                .map(|member| match member {
                    Member::Single(item) => Member::Single(item.negate()),
                    Member::Bundle(items) => {
                        Member::Bundle(items.into_iter().map(Negate::negate).collect())
                    }
                })
                .collect(),
        }
    }
}

/// Folds terms and `or` connectors into a [`LogicTree`].
/// Terms added between two `or` calls end up AND-ed in the same slot.
#[derive(Debug)]
pub struct LogicAccumulator<T> {
    slots: Vec<Vec<T>>,
    current: usize,
}

impl<T> Default for LogicAccumulator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LogicAccumulator<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            current: 0,
        }
    }

    pub fn add_and(&mut self, item: T) {
        if self.slots.len() <= self.current {
            self.slots.push(Vec::new());
        }
        self.slots[self.current].push(item);
    }

    /// Start a new branch. Repeated or leading `or` never creates an empty branch.
    pub fn or(&mut self) {
        if self
            .slots
            .get(self.current)
            .is_some_and(|slot| !slot.is_empty())
        {
            self.current += 1;
        }
    }

    /// A single slot becomes an AND tree of its items, even when it holds one item.
    /// Anything else is an OR tree of the slots. Nothing at all is an empty AND tree.
    pub fn into_tree(mut self) -> LogicTree<T> {
        if self.slots.len() <= 1 {
            let items = self.slots.pop().unwrap_or_default();
            return LogicTree {
                connective: Connective::And,
                members: items.into_iter().map(Member::Single).collect(),
            };
        }

        LogicTree {
            connective: Connective::Or,
            members: self
                .slots
                .into_iter()
                .filter(|slot| !slot.is_empty())
                .map(|mut slot| {
                    if slot.len() == 1 {
                        Member::Single(slot.remove(0))
                    } else {
                        Member::Bundle(slot)
                    }
                })
                .collect(),
        }
    }
}
