//! CSS selector compilation and matching.
//!
//! This module implements selector parsing and matching per
//! [Selectors Level 4](https://www.w3.org/TR/selectors-4/), extended with
//! the dynamic-state bookkeeping the engine needs: matching an element
//! reports not just *whether* a selector matched but whether any dynamic
//! pseudo-class took part in the decision, so hover changes can be turned
//! into minimal redraws.

use vellum_dom::{DomTree, ElementData, NodeId, PseudoClassSet};

/// Attribute comparison operators.
///
/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOp {
    /// `[attr]` — the attribute exists.
    Exists,
    /// `[attr=v]` — exact value match.
    Equals,
    /// `[attr~=v]` — whitespace-separated word match.
    ContainsWord,
    /// `[attr|=v]` — exact or `v-` prefix match.
    DashMatch,
    /// `[attr^=v]` — prefix match.
    StartsWith,
    /// `[attr$=v]` — suffix match.
    EndsWith,
    /// `[attr*=v]` — substring match.
    ContainsStr,
}

/// Pseudo-classes the matcher understands.
///
/// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
#[derive(Debug, Clone, PartialEq)]
pub enum PseudoClass {
    /// `:hover` — consults the element's dynamic state.
    Hover,
    /// `:active` — consults the element's dynamic state.
    Active,
    /// `:focus` — consults the element's dynamic state.
    Focus,
    /// `:link` — an unvisited link.
    Link,
    /// `:visited` — a visited link (state supplied by the embedder).
    Visited,
    /// `:root` — the document element.
    Root,
    /// `:first-child`
    FirstChild,
    /// `:last-child`
    LastChild,
    /// `:only-child`
    OnlyChild,
    /// `:first-of-type`
    FirstOfType,
    /// `:last-of-type`
    LastOfType,
    /// `:only-of-type`
    OnlyOfType,
    /// `:nth-child(An+B)`
    NthChild(i32, i32),
    /// `:nth-last-child(An+B)`
    NthLastChild(i32, i32),
    /// `:nth-of-type(An+B)`
    NthOfType(i32, i32),
    /// `:nth-last-of-type(An+B)`
    NthLastOfType(i32, i32),
    /// `:not(<compound>)`
    Not(Box<CompoundSelector>),
    /// `:lang(xx)` — prefix match against the document language.
    Lang(String),
}

impl PseudoClass {
    /// True for states that can flip at runtime (mouse/focus driven).
    ///
    /// A rule whose match involved one of these is recorded as dynamic so
    /// the engine can re-evaluate it after input events.
    #[must_use]
    pub const fn is_dynamic(&self) -> bool {
        matches!(
            self,
            Self::Hover | Self::Active | Self::Focus | Self::Link | Self::Visited
        )
    }
}

/// Pseudo-elements.
///
/// [§ 11 Pseudo-elements](https://www.w3.org/TR/selectors-4/#pseudo-elements)
///
/// Only the tree-generating pair is supported; their content is
/// materialized into real elements before layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoElement {
    /// `::before` / `:before`
    Before,
    /// `::after` / `:after`
    After,
}

/// A single condition inside a compound selector.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `.class`
    Class(String),
    /// `#id`
    Id(String),
    /// `[attr op value]`
    Attribute {
        /// Attribute name, lowercased.
        name: String,
        /// The comparison operator.
        op: AttrOp,
        /// The right-hand value (empty for `Exists`).
        value: String,
    },
    /// `:pseudo-class`
    Pseudo(PseudoClass),
    /// `::pseudo-element`
    PseudoElem(PseudoElement),
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
///
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator."
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompoundSelector {
    /// The type selector, lowercased; `None` covers both `*` and an
    /// absent tag.
    pub tag: Option<String>,
    /// The remaining simple selectors, in source order.
    pub conditions: Vec<Condition>,
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `A B` — B is an arbitrary descendant of A.
    Descendant,
    /// `A > B` — B is a direct child of A.
    Child,
    /// `A + B` — B immediately follows A (element siblings only).
    AdjacentSibling,
    /// `A ~ B` — B follows A somewhere among later siblings.
    GeneralSibling,
}

/// [§ 17 Calculating Specificity](https://www.w3.org/TR/selectors-4/#specificity-rules)
///
/// The classic CSS 2.1 four-tuple `(a, b, c, d)` compared
/// lexicographically: `a` counts the style attribute (always 0 for sheet
/// rules), `b` id selectors, `c` class/attribute/pseudo-class selectors,
/// `d` type selectors and pseudo-elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Specificity(pub u32, pub u32, pub u32, pub u32);

impl Specificity {
    /// Create a specificity with explicit components.
    #[must_use]
    pub const fn new(a: u32, b: u32, c: u32, d: u32) -> Self {
        Self(a, b, c, d)
    }
}

/// Result of matching a selector against an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    /// The selector does not match.
    NoMatch,
    /// The selector matches with no dynamic conditions involved.
    Match,
    /// The selector matches and at least one dynamic pseudo-class
    /// participated — the rule's applicability can change at runtime.
    MatchPseudoClass,
}

impl MatchResult {
    /// True for either match flavor.
    #[must_use]
    pub const fn is_match(self) -> bool {
        !matches!(self, Self::NoMatch)
    }
}

/// Context for a match run.
#[derive(Debug, Clone, Default)]
pub struct MatchContext {
    /// When true, dynamic pseudo-classes test the element's actual state;
    /// when false they are assumed satisfied (used to discover which
    /// rules *could* apply).
    pub apply_pseudo: bool,
    /// The document language, for `:lang()` (prefix-match semantics).
    pub lang: String,
}

/// A compiled complex selector: the subject compound plus a right-to-left
/// chain of (combinator, compound) pairs.
///
/// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
///
/// For `A > B C` the subject is `C` and the chain is
/// `[(Descendant, B), (Child, A)]` — matching walks up from the subject.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    /// The rightmost compound (the subject of the selector).
    pub subject: CompoundSelector,
    /// Chain going left from the subject.
    pub chain: Vec<(Combinator, CompoundSelector)>,
}

impl Selector {
    /// [§ 17](https://www.w3.org/TR/selectors-4/#specificity-rules)
    ///
    /// Sum specificity over every compound in the chain.
    #[must_use]
    pub fn specificity(&self) -> Specificity {
        let mut total = compound_specificity(&self.subject);
        for (_, compound) in &self.chain {
            let s = compound_specificity(compound);
            total.1 += s.1;
            total.2 += s.2;
            total.3 += s.3;
        }
        total
    }

    /// Match this selector against an element.
    ///
    /// Returns [`MatchResult::MatchPseudoClass`] instead of plain `Match`
    /// whenever a dynamic pseudo-class condition was involved anywhere in
    /// the chain, matched or assumed.
    #[must_use]
    pub fn select(&self, tree: &DomTree, node: NodeId, ctx: &MatchContext) -> MatchResult {
        let mut dynamic = false;
        if !match_compound(&self.subject, tree, node, ctx, &mut dynamic) {
            return MatchResult::NoMatch;
        }
        if !match_chain(&self.chain, 0, tree, node, ctx, &mut dynamic) {
            return MatchResult::NoMatch;
        }
        if dynamic {
            MatchResult::MatchPseudoClass
        } else {
            MatchResult::Match
        }
    }

    /// The subject's pseudo-element, if the selector targets one
    /// (`p::before` etc.).
    #[must_use]
    pub fn pseudo_element(&self) -> Option<PseudoElement> {
        self.subject.conditions.iter().find_map(|c| match c {
            Condition::PseudoElem(pe) => Some(*pe),
            _ => None,
        })
    }

    /// Parse a selector from text. Returns `None` for syntax the matcher
    /// cannot represent — the rule is then dropped, never misapplied.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        parse::parse_selector(text)
    }
}

/// [§ 17](https://www.w3.org/TR/selectors-4/#specificity-rules) for one compound.
fn compound_specificity(compound: &CompoundSelector) -> Specificity {
    let mut spec = Specificity::default();
    if compound.tag.is_some() {
        spec.3 += 1;
    }
    for condition in &compound.conditions {
        match condition {
            Condition::Id(_) => spec.1 += 1,
            Condition::Class(_) | Condition::Attribute { .. } => spec.2 += 1,
            Condition::Pseudo(PseudoClass::Not(inner)) => {
                // ":not() itself contributes nothing, but its argument does."
                let inner_spec = compound_specificity(inner);
                spec.1 += inner_spec.1;
                spec.2 += inner_spec.2;
                spec.3 += inner_spec.3;
            }
            Condition::Pseudo(_) => spec.2 += 1,
            Condition::PseudoElem(_) => spec.3 += 1,
        }
    }
    spec
}

/// Match the chain starting at `index`, anchored at `node` (which already
/// matched the compound to the right). Descendant and general-sibling
/// combinators backtrack: every candidate ancestor/sibling is tried
/// before giving up.
fn match_chain(
    chain: &[(Combinator, CompoundSelector)],
    index: usize,
    tree: &DomTree,
    node: NodeId,
    ctx: &MatchContext,
    dynamic: &mut bool,
) -> bool {
    let Some((combinator, compound)) = chain.get(index) else {
        return true;
    };

    match combinator {
        Combinator::Child => {
            let Some(parent) = element_parent(tree, node) else {
                return false;
            };
            match_compound(compound, tree, parent, ctx, dynamic)
                && match_chain(chain, index + 1, tree, parent, ctx, dynamic)
        }
        Combinator::Descendant => {
            let mut current = element_parent(tree, node);
            while let Some(ancestor) = current {
                if match_compound(compound, tree, ancestor, ctx, dynamic)
                    && match_chain(chain, index + 1, tree, ancestor, ctx, dynamic)
                {
                    return true;
                }
                current = element_parent(tree, ancestor);
            }
            false
        }
        Combinator::AdjacentSibling => {
            let Some(prev) = previous_element_sibling(tree, node) else {
                return false;
            };
            match_compound(compound, tree, prev, ctx, dynamic)
                && match_chain(chain, index + 1, tree, prev, ctx, dynamic)
        }
        Combinator::GeneralSibling => {
            let mut current = previous_element_sibling(tree, node);
            while let Some(sibling) = current {
                if match_compound(compound, tree, sibling, ctx, dynamic)
                    && match_chain(chain, index + 1, tree, sibling, ctx, dynamic)
                {
                    return true;
                }
                current = previous_element_sibling(tree, sibling);
            }
            false
        }
    }
}

/// Parent, but only if it is an element (never the document node).
fn element_parent(tree: &DomTree, node: NodeId) -> Option<NodeId> {
    let parent = tree.parent(node)?;
    tree.as_element(parent).map(|_| parent)
}

/// The immediately preceding element sibling, skipping text and comments.
fn previous_element_sibling(tree: &DomTree, node: NodeId) -> Option<NodeId> {
    tree.preceding_siblings(node)
        .find(|&sibling| tree.as_element(sibling).is_some())
}

/// Match one compound selector against one element.
fn match_compound(
    compound: &CompoundSelector,
    tree: &DomTree,
    node: NodeId,
    ctx: &MatchContext,
    dynamic: &mut bool,
) -> bool {
    let Some(element) = tree.as_element(node) else {
        return false;
    };

    if let Some(tag) = &compound.tag {
        if !tree.is_tag(node, tag) {
            return false;
        }
    }

    compound
        .conditions
        .iter()
        .all(|condition| match_condition(condition, tree, node, element, ctx, dynamic))
}

fn match_condition(
    condition: &Condition,
    tree: &DomTree,
    node: NodeId,
    element: &ElementData,
    ctx: &MatchContext,
    dynamic: &mut bool,
) -> bool {
    match condition {
        Condition::Class(name) => element.classes().contains(name.as_str()),
        Condition::Id(id) => element.id().is_some_and(|el_id| el_id == id),
        Condition::Attribute { name, op, value } => match_attribute(element, name, *op, value),
        // Pseudo-elements never fail the element match; the style engine
        // routes these rules to the materialized child.
        Condition::PseudoElem(_) => true,
        Condition::Pseudo(pseudo) => match_pseudo(pseudo, tree, node, element, ctx, dynamic),
    }
}

/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
fn match_attribute(element: &ElementData, name: &str, op: AttrOp, value: &str) -> bool {
    let Some(actual) = element.attr(name) else {
        return false;
    };
    match op {
        AttrOp::Exists => true,
        AttrOp::Equals => actual == value,
        AttrOp::ContainsWord => actual.split_ascii_whitespace().any(|word| word == value),
        AttrOp::DashMatch => {
            actual == value || actual.strip_prefix(value).is_some_and(|r| r.starts_with('-'))
        }
        AttrOp::StartsWith => !value.is_empty() && actual.starts_with(value),
        AttrOp::EndsWith => !value.is_empty() && actual.ends_with(value),
        AttrOp::ContainsStr => !value.is_empty() && actual.contains(value),
    }
}

fn match_pseudo(
    pseudo: &PseudoClass,
    tree: &DomTree,
    node: NodeId,
    element: &ElementData,
    ctx: &MatchContext,
    dynamic: &mut bool,
) -> bool {
    match pseudo {
        PseudoClass::Hover
        | PseudoClass::Active
        | PseudoClass::Focus
        | PseudoClass::Link
        | PseudoClass::Visited => {
            *dynamic = true;
            if !ctx.apply_pseudo {
                // Discovery pass: assume satisfied; the caller records the
                // rule as state-dependent.
                return true;
            }
            let wanted = match pseudo {
                PseudoClass::Hover => PseudoClassSet::HOVER,
                PseudoClass::Active => PseudoClassSet::ACTIVE,
                PseudoClass::Focus => PseudoClassSet::FOCUS,
                PseudoClass::Link => PseudoClassSet::LINK,
                _ => PseudoClassSet::VISITED,
            };
            element.pseudo_states.contains(wanted)
        }

        PseudoClass::Root => tree.document_element() == Some(node),

        PseudoClass::FirstChild => nth_forward_index(tree, node, false) == 1,
        PseudoClass::LastChild => nth_backward_index(tree, node, false) == 1,
        PseudoClass::OnlyChild => {
            nth_forward_index(tree, node, false) == 1 && nth_backward_index(tree, node, false) == 1
        }
        PseudoClass::FirstOfType => nth_forward_index(tree, node, true) == 1,
        PseudoClass::LastOfType => nth_backward_index(tree, node, true) == 1,
        PseudoClass::OnlyOfType => {
            nth_forward_index(tree, node, true) == 1 && nth_backward_index(tree, node, true) == 1
        }

        PseudoClass::NthChild(a, b) => nth_matches(*a, *b, nth_forward_index(tree, node, false)),
        PseudoClass::NthLastChild(a, b) => {
            nth_matches(*a, *b, nth_backward_index(tree, node, false))
        }
        PseudoClass::NthOfType(a, b) => nth_matches(*a, *b, nth_forward_index(tree, node, true)),
        PseudoClass::NthLastOfType(a, b) => {
            nth_matches(*a, *b, nth_backward_index(tree, node, true))
        }

        PseudoClass::Not(inner) => !match_compound(inner, tree, node, ctx, dynamic),

        // [§ 13.1 :lang](https://www.w3.org/TR/selectors-4/#the-lang-pseudo)
        // Prefix-match against the embedder-supplied language: ":lang(en)"
        // matches "en" and "en-US".
        PseudoClass::Lang(wanted) => {
            let lang = ctx.lang.to_ascii_lowercase();
            let wanted = wanted.to_ascii_lowercase();
            lang == wanted
                || lang
                    .strip_prefix(&wanted)
                    .is_some_and(|rest| rest.starts_with('-'))
        }
    }
}

/// [§ 4.12 Child-indexed pseudo-classes](https://www.w3.org/TR/selectors-4/#child-index)
///
/// "`An+B` matches the element if there exists a non-negative integer n
/// such that the element's index equals An+B": i.e.
/// `(index − B) ≡ 0 (mod A)` and `(index − B)/A ≥ 0`; `A = 0` degenerates
/// to an exact index test.
fn nth_matches(a: i32, b: i32, index: i32) -> bool {
    if a == 0 {
        return index == b;
    }
    let diff = index - b;
    diff % a == 0 && diff / a >= 0
}

/// 1-based index among element siblings, counting forward. With
/// `of_type`, only siblings with the same tag count.
fn nth_forward_index(tree: &DomTree, node: NodeId, of_type: bool) -> i32 {
    sibling_index(tree, node, of_type, false)
}

/// 1-based index counting backward from the last sibling.
fn nth_backward_index(tree: &DomTree, node: NodeId, of_type: bool) -> i32 {
    sibling_index(tree, node, of_type, true)
}

fn sibling_index(tree: &DomTree, node: NodeId, of_type: bool, reverse: bool) -> i32 {
    let tag = tree.as_element(node).map(|e| e.tag);
    let Some(parent) = tree.parent(node) else {
        return 1;
    };
    let siblings = tree.children(parent);
    let iter: Box<dyn Iterator<Item = &NodeId>> = if reverse {
        Box::new(siblings.iter().rev())
    } else {
        Box::new(siblings.iter())
    };

    let mut index = 0;
    for &sibling in iter {
        let Some(element) = tree.as_element(sibling) else {
            continue;
        };
        if of_type && Some(element.tag) != tag {
            continue;
        }
        index += 1;
        if sibling == node {
            return index;
        }
    }
    index.max(1)
}

mod parse;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specificity_four_tuple() {
        let sel = Selector::parse("#nav li.item a[href]:hover").expect("parse");
        // ids: 1, class+attr+pseudo: 3, tags: 3
        assert_eq!(sel.specificity(), Specificity::new(0, 1, 3, 3));
    }

    #[test]
    fn universal_contributes_nothing() {
        let sel = Selector::parse("*").expect("parse");
        assert_eq!(sel.specificity(), Specificity::default());
    }

    #[test]
    fn not_argument_counts() {
        let sel = Selector::parse("p:not(.x)").expect("parse");
        assert_eq!(sel.specificity(), Specificity::new(0, 0, 1, 1));
    }

    #[test]
    fn nth_formula() {
        // 2n+1: odd indices
        assert!(nth_matches(2, 1, 1));
        assert!(!nth_matches(2, 1, 2));
        assert!(nth_matches(2, 1, 3));
        // 0n+4: exactly the fourth
        assert!(nth_matches(0, 4, 4));
        assert!(!nth_matches(0, 4, 8));
        // -n+3: first three
        assert!(nth_matches(-1, 3, 1));
        assert!(nth_matches(-1, 3, 3));
        assert!(!nth_matches(-1, 3, 4));
    }
}
