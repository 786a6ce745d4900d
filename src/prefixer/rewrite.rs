//! Text-level namespace rewriting.
//!
//! [`NamespaceRewriter`] applies a [`NamespaceTable`] to one unit of text in
//! one of three modes:
//!
//! - [`RewriteMode::Declaration`] for files that *belong to* a bundled
//!   package: their `namespace` statement, `use` imports (plain and
//!   aliased), and qualified in-code references all move under the prefix.
//! - [`RewriteMode::Reference`] for first-party files that merely *consume*
//!   a bundled namespace: only `use` imports are rewritten.
//! - [`RewriteMode::Metadata`] for Composer's generated autoloader tables,
//!   where namespaces appear as quoted string keys with doubled backslashes
//!   (`'Acme\\Lib\\' => ...`).
//!
//! Entries are applied in descending order of original-namespace length so
//! the most specific namespace always wins, and every pattern is anchored to
//! an identifier boundary: a freshly inserted `Prefix\` can never be matched
//! again within the same pass, and a namespace that is a prefix of another
//! (`Acme` vs `AcmeTools`) can neither shadow it nor be shadowed by it.
//!
//! Rewriting does not parse PHP. The patterns recognize four statement
//! shapes and nothing else; content that does not use them (strings,
//! comments, heredocs) may occasionally be touched when it textually mimics
//! a qualified reference. Binary and non-PHP files never reach this module.

use anyhow::{Context, Result};
use regex::Regex;

use crate::prefixer::NamespaceTable;

/// Which pattern family applies to a file's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteMode {
    /// The file declares a bundled namespace (vendor package source).
    Declaration,
    /// The file only imports bundled namespaces (first-party source).
    Reference,
    /// The file is a generated lookup table keyed by namespace strings.
    Metadata,
}

/// One table entry, compiled.
struct EntryRules {
    /// Prefixed namespace at an identifier boundary; presence means the
    /// entry was already applied (or the text was authored prefixed).
    guard: Regex,
    /// Same check against the doubled-backslash spelling used in metadata.
    guard_metadata: Regex,
    namespace_decl: (Regex, String),
    use_plain: (Regex, String),
    use_aliased: (Regex, String),
    qualified_ref: (Regex, String),
    metadata_key: (Regex, String),
}

impl EntryRules {
    fn compile(original: &str, prefixed: &str) -> Result<Self> {
        let esc = regex::escape(original);
        let pesc = regex::escape(prefixed);

        // Metadata files spell the separator as an escaped backslash.
        let original_dd = original.replace('\\', "\\\\");
        let prefixed_dd = prefixed.replace('\\', "\\\\");
        let esc_dd = regex::escape(&original_dd);
        let pesc_dd = regex::escape(&prefixed_dd);

        let build = |pattern: &str| {
            Regex::new(pattern)
                .with_context(|| format!("Failed to compile rewrite pattern for '{original}'"))
        };

        Ok(Self {
            guard: build(&format!(r"{pesc}(?:[^A-Za-z0-9_]|\z)"))?,
            guard_metadata: build(&format!(r"{pesc_dd}(?:[^A-Za-z0-9_]|\z)"))?,
            namespace_decl: (
                build(&format!(r"(?m)^namespace\s+{esc}(\\[^;]*)?;"))?,
                format!("namespace {prefixed}${{1}};"),
            ),
            use_plain: (
                build(&format!(r"(?m)^use\s+{esc}(\\[^;]*)?;"))?,
                format!("use {prefixed}${{1}};"),
            ),
            use_aliased: (
                build(&format!(r"(?m)^use\s+{esc}(\\[^\s;]+)\s+as\s+([^;]+);"))?,
                format!("use {prefixed}${{1}} as ${{2}};"),
            ),
            qualified_ref: (
                build(&format!(r"(?m)(^|[^A-Za-z0-9_\\])(\\?){esc}\\"))?,
                format!("${{1}}${{2}}{prefixed}\\"),
            ),
            metadata_key: (
                build(&format!(r#"(['"]){esc_dd}\\\\"#))?,
                format!("${{1}}{prefixed_dd}\\\\"),
            ),
        })
    }

    fn already_prefixed(&self, content: &str, mode: RewriteMode) -> bool {
        match mode {
            RewriteMode::Metadata => self.guard_metadata.is_match(content),
            _ => self.guard.is_match(content),
        }
    }
}

/// A namespace table compiled against one prefix, ready to rewrite any
/// number of files.
pub struct NamespaceRewriter {
    rules: Vec<EntryRules>,
}

impl NamespaceRewriter {
    /// Compiles every table entry, ordered longest-original-first.
    pub fn new(table: &NamespaceTable) -> Result<Self> {
        let rules = table
            .entries_longest_first()
            .into_iter()
            .map(|(original, prefixed)| EntryRules::compile(original, prefixed))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Rewrites one unit of text.
    ///
    /// Per entry, the idempotence guard runs first: content that already
    /// carries the prefixed namespace at an identifier boundary is left
    /// alone for that entry, so a file is never double-rewritten no matter
    /// how often it passes through.
    pub fn rewrite(&self, content: &str, mode: RewriteMode) -> String {
        let mut text = content.to_string();
        for entry in &self.rules {
            if entry.already_prefixed(&text, mode) {
                continue;
            }
            match mode {
                RewriteMode::Declaration => {
                    text = apply(&entry.namespace_decl, &text);
                    text = apply(&entry.use_plain, &text);
                    text = apply(&entry.use_aliased, &text);
                    text = apply(&entry.qualified_ref, &text);
                }
                RewriteMode::Reference => {
                    text = apply(&entry.use_plain, &text);
                    text = apply(&entry.use_aliased, &text);
                }
                RewriteMode::Metadata => {
                    text = apply(&entry.metadata_key, &text);
                }
            }
        }
        text
    }
}

fn apply(rule: &(Regex, String), text: &str) -> String {
    rule.0.replace_all(text, rule.1.as_str()).into_owned()
}
