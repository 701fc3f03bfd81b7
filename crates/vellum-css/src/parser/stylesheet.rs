//! Stylesheets and cascade ordering.
//!
//! [CSS Cascading and Inheritance Level 4 § 6](https://www.w3.org/TR/css-cascade-4/#cascading)
//!
//! A stylesheet is a flat vector of rules. After every ingestion pass the
//! sheet is re-sorted, stably, by `(specificity, source index)`; the
//! `!important` bit stays on each declaration and is honored at merge
//! time, which together gives the `(important, specificity, source
//! order)` cascade. Source indices run across files in inclusion order,
//! so the master sheet (ingested first) always loses to author rules of
//! equal specificity.

use crate::media::{MediaFeatures, MediaQueryList};
use crate::selector::{Selector, Specificity};

use super::parser::ComponentValue;

/// A single `name: value` declaration with its importance bit.
///
/// [§ 5.3.6 Parse a declaration](https://www.w3.org/TR/css-syntax-3/#parse-declaration)
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// Property name, lowercased.
    pub name: String,
    /// The declaration's value as component values, whitespace-trimmed.
    pub value: Vec<ComponentValue>,
    /// [Cascading § 6.4.2](https://www.w3.org/TR/css-cascade-4/#importance)
    /// "An important declaration takes precedence over a normal one."
    pub important: bool,
}

/// One selector bound to one declaration block.
///
/// A source rule with a selector list fans out into one `StyleRule` per
/// selector; they share the declaration block and source index.
#[derive(Debug, Clone)]
pub struct StyleRule {
    /// The compiled selector.
    pub selector: Selector,
    /// The rule's declarations in source order.
    pub declarations: Vec<Declaration>,
    /// Cached `selector.specificity()` for the cascade sort.
    pub specificity: Specificity,
    /// Position of the source rule across all ingested files.
    pub source_index: u32,
    /// Index into [`Stylesheet::media_lists`], if the rule sits under an
    /// `@media` scope (or an `@import` with a media clause).
    pub media: Option<usize>,
}

/// An `@import` found during parsing, waiting for the embedder to resolve.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDirective {
    /// The imported url, exactly as written.
    pub url: String,
    /// Media scope for every rule of the imported sheet.
    pub media: Option<usize>,
}

/// A parsed stylesheet: rules in cascade order plus media scopes and
/// pending imports.
#[derive(Debug, Default)]
pub struct Stylesheet {
    /// All rules. Sorted by [`Stylesheet::sort`]; callers that append
    /// rules must re-sort before matching.
    pub rules: Vec<StyleRule>,
    /// Media query lists referenced by rules (index = `StyleRule::media`).
    pub media_lists: Vec<MediaQueryList>,
    /// Imports discovered during parsing, drained by the embedder.
    pub imports: Vec<ImportDirective>,
    /// Next source index to hand out.
    next_index: u32,
}

impl Stylesheet {
    /// An empty sheet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next source index for a rule (selector-list fan-out
    /// shares one index).
    pub fn next_source_index(&mut self) -> u32 {
        let index = self.next_index;
        self.next_index += 1;
        index
    }

    /// Append a rule. The sheet is unsorted until [`Stylesheet::sort`].
    pub fn push_rule(&mut self, rule: StyleRule) {
        self.rules.push(rule);
    }

    /// Register a media query list, returning its index.
    pub fn add_media_list(&mut self, list: MediaQueryList) -> usize {
        self.media_lists.push(list);
        self.media_lists.len() - 1
    }

    /// Record an import for the embedder to resolve.
    pub fn add_import(&mut self, import: ImportDirective) {
        self.imports.push(import);
    }

    /// [Cascading § 6.4](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
    ///
    /// Stable sort by `(specificity, source index)`. Stability preserves
    /// source order between equal keys; the `!important` leg of the
    /// cascade is applied per-declaration when rules are merged onto an
    /// element.
    pub fn sort(&mut self) {
        self.rules
            .sort_by(|a, b| (a.specificity, a.source_index).cmp(&(b.specificity, b.source_index)));
    }

    /// Whether `rule`'s media scope applies under the given features.
    #[must_use]
    pub fn rule_applies(&self, rule: &StyleRule, features: &MediaFeatures) -> bool {
        match rule.media {
            None => true,
            Some(index) => self
                .media_lists
                .get(index)
                .is_none_or(|list| list.applies(features)),
        }
    }

    /// Uses the same media scope for rules appended while resolving an
    /// import: the imported sheet's rules inherit the importing clause.
    #[must_use]
    pub fn media_scope_of_import(&self, import: &ImportDirective) -> Option<usize> {
        import.media
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::CssParser;
    use crate::tokenizer::CssTokenizer;

    fn parse(css: &str) -> Stylesheet {
        let mut tokenizer = CssTokenizer::new(css);
        tokenizer.run();
        CssParser::new(tokenizer.into_tokens()).parse_stylesheet()
    }

    #[test]
    fn sort_orders_by_specificity_then_source() {
        let mut sheet = parse("#a { color: red } p { color: blue } .c { color: green }");
        sheet.sort();
        let names: Vec<u32> = sheet.rules.iter().map(|r| r.source_index).collect();
        // p (0,0,0,1) < .c (0,0,1,0) < #a (0,1,0,0)
        assert_eq!(names, vec![1, 2, 0]);
    }

    #[test]
    fn sort_is_stable_for_equal_specificity() {
        let mut sheet = parse("p { color: red } p { color: blue }");
        sheet.sort();
        assert!(sheet.rules[0].source_index < sheet.rules[1].source_index);
    }

    #[test]
    fn source_indices_continue_across_ingestions() {
        let mut sheet = parse("p { color: red }");
        let mut tokenizer = CssTokenizer::new("div { color: blue }");
        tokenizer.run();
        CssParser::new(tokenizer.into_tokens()).parse_into(&mut sheet, None);
        assert_eq!(sheet.rules.len(), 2);
        assert!(sheet.rules[0].source_index < sheet.rules[1].source_index);
    }
}
