//! A configuration value wraps a format string's original text together
//! with its parsed tree (§4.F), so the tree never has to be reparsed on
//! every render, while the host still sees and stores plain text.

use anyhow::{bail, Context, Result};
use fmt_core::{DefinitionTable, Node};

/// A parsed format string, ready to hand to [`fmt_render::render`].
///
/// Equality compares `original_text` only, not the tree: two values with
/// the same text are always equal even if re-parsed into structurally
/// distinct (but equivalent) trees.
#[derive(Debug, Clone)]
pub struct FormatValue {
    original_text: String,
    tree: Node,
}

impl FormatValue {
    fn parse(text: &str, defs: &DefinitionTable) -> Result<Self> {
        let tree = fmt_parser::parse(text, defs)
            .with_context(|| format!("invalid format string: {text:?}"))?;
        Ok(Self {
            original_text: text.to_string(),
            tree,
        })
    }

    /// The text this value was parsed from, verbatim.
    pub fn as_str(&self) -> &str {
        &self.original_text
    }

    /// The parsed tree, ready for [`fmt_render::render`].
    pub fn tree(&self) -> &Node {
        &self.tree
    }
}

impl PartialEq for FormatValue {
    fn eq(&self, other: &Self) -> bool {
        self.original_text == other.original_text
    }
}
impl Eq for FormatValue {}

#[cfg(feature = "serde")]
impl serde::Serialize for FormatValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.original_text)
    }
}

/// Runs after a candidate value parses but before it replaces the
/// current one; an `Err` aborts the set and leaves the variable
/// unchanged (§4.F "validator").
pub type Validator = dyn Fn(&FormatValue) -> Result<()> + Send + Sync;

/// A named format-string config variable: owns its current and initial
/// [`FormatValue`], an optional non-empty constraint, an optional
/// validator, and the startup-only write gate (§4.F).
pub struct FormatVariable {
    name: String,
    value: FormatValue,
    initial_text: String,
    defs: DefinitionTable,
    non_empty: bool,
    startup_only: bool,
    in_startup: bool,
    validator: Option<Box<Validator>>,
}

impl FormatVariable {
    pub fn new(
        name: impl Into<String>,
        initial_text: impl Into<String>,
        defs: DefinitionTable,
        non_empty: bool,
        startup_only: bool,
    ) -> Result<Self> {
        let name = name.into();
        let initial_text = initial_text.into();
        let value = FormatValue::parse(&initial_text, &defs)
            .with_context(|| format!("variable {name:?} has an invalid initial value"))?;
        Ok(Self {
            name,
            value,
            initial_text,
            defs,
            non_empty,
            startup_only,
            in_startup: true,
            validator: None,
        })
    }

    pub fn with_validator(mut self, validator: Box<Validator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Called once the host leaves its startup phase; after this,
    /// `startup_only` variables reject further writes.
    pub fn end_startup(&mut self) {
        self.in_startup = false;
    }

    fn check_writable(&self) -> Result<()> {
        if self.startup_only && !self.in_startup {
            bail!("{:?} can only be set during startup", self.name);
        }
        Ok(())
    }

    /// Parse `text`, validate it, and replace the current value if it
    /// differs by text from the current one (§4.F "string-set"). A
    /// no-op if `text` equals the current `original_text`: the
    /// validator does not re-run on a value that hasn't changed.
    pub fn string_set(&mut self, text: &str) -> Result<()> {
        self.check_writable()?;
        if text.is_empty() && self.non_empty {
            bail!("{:?} may not be set to an empty string", self.name);
        }
        if text == self.value.original_text {
            return Ok(());
        }
        let candidate = FormatValue::parse(text, &self.defs)?;
        if let Some(validator) = &self.validator {
            validator(&candidate)?;
        }
        tracing::info!(target: "fmt_config", variable = %self.name, value = %candidate.original_text, "set");
        self.value = candidate;
        Ok(())
    }

    /// The current value's original text (§4.F "string-get").
    pub fn string_get(&self) -> &str {
        &self.value.original_text
    }

    /// The current value's parsed tree, ready for [`fmt_render::render`].
    pub fn tree(&self) -> &Node {
        self.value.tree()
    }

    /// Replace the whole parsed value directly, bypassing re-parsing
    /// (§4.F "native-set"): the caller already holds a [`FormatValue`],
    /// typically one produced by another variable's [`Self::native_get`].
    pub fn native_set(&mut self, value: FormatValue) -> Result<()> {
        self.check_writable()?;
        if value.original_text.is_empty() && self.non_empty {
            bail!("{:?} may not be set to an empty string", self.name);
        }
        if let Some(validator) = &self.validator {
            validator(&value)?;
        }
        tracing::info!(target: "fmt_config", variable = %self.name, value = %value.original_text, "native set");
        self.value = value;
        Ok(())
    }

    /// A clone of the current parsed value (§4.F "native-get").
    pub fn native_get(&self) -> FormatValue {
        self.value.clone()
    }

    /// Concatenate `suffix` onto the current text and reparse the
    /// result, following the same validator path as [`Self::string_set`]
    /// (§4.F "string-plus-equals").
    pub fn string_plus_equals(&mut self, suffix: &str) -> Result<()> {
        let combined = format!("{}{}", self.value.original_text, suffix);
        self.string_set(&combined)
    }

    /// Reparse the variable's initial text and run the same validator
    /// path (§4.F "reset"). Always allowed, even on a `startup_only`
    /// variable outside of startup: resetting to the compiled-in
    /// default cannot widen what the variable is set to.
    pub fn reset(&mut self) -> Result<()> {
        let candidate = FormatValue::parse(&self.initial_text, &self.defs)?;
        if let Some(validator) = &self.validator {
            validator(&candidate)?;
        }
        tracing::info!(target: "fmt_config", variable = %self.name, "reset to initial value");
        self.value = candidate;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Release the tree and text. Dropping `self` does the same thing;
    /// this exists for call sites that want to name the moment
    /// explicitly (§4.F "destroy").
    pub fn destroy(self) {}
}

impl std::fmt::Debug for FormatVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatVariable")
            .field("name", &self.name)
            .field("value", &self.value.original_text)
            .field("non_empty", &self.non_empty)
            .field("startup_only", &self.startup_only)
            .field("in_startup", &self.in_startup)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fmt_core::{DataType, SymbolDef};
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    fn defs() -> DefinitionTable {
        DefinitionTable::new(vec![SymbolDef {
            domain: 1,
            uid: 1,
            short_name: "s",
            long_name: None,
            data_type: DataType::String,
            is_date_shorthand: false,
            takes_enclosed_text: false,
        }])
    }

    #[derive(Clone)]
    struct BufferWriter(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for BufferWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[derive(Clone)]
    struct LockedWriter(Arc<Mutex<Vec<u8>>>);

    impl<'a> MakeWriter<'a> for LockedWriter {
        type Writer = BufferWriter;
        fn make_writer(&'a self) -> Self::Writer {
            BufferWriter(self.0.clone())
        }
    }

    #[test]
    fn string_set_reparses_and_replaces() {
        let mut var = FormatVariable::new("index_format", "%s", defs(), false, false).unwrap();
        var.string_set("text: %s").unwrap();
        assert_eq!(var.string_get(), "text: %s");
    }

    #[test]
    fn string_set_rejects_empty_for_non_empty_variable() {
        let mut var = FormatVariable::new("index_format", "%s", defs(), true, false).unwrap();
        assert!(var.string_set("").is_err());
        assert_eq!(var.string_get(), "%s");
    }

    #[test]
    fn string_set_rejects_invalid_syntax_and_leaves_value_unchanged() {
        let mut var = FormatVariable::new("index_format", "%s", defs(), false, false).unwrap();
        assert!(var.string_set("%<unterminated").is_err());
        assert_eq!(var.string_get(), "%s");
    }

    #[test]
    fn string_set_no_op_on_identical_text_skips_validator() {
        let calls = Arc::new(Mutex::new(0));
        let calls_clone = calls.clone();
        let mut var = FormatVariable::new("index_format", "%s", defs(), false, false)
            .unwrap()
            .with_validator(Box::new(move |_| {
                *calls_clone.lock().unwrap() += 1;
                Ok(())
            }));
        var.string_set("%s").unwrap();
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn validator_rejection_leaves_value_unchanged() {
        let mut var = FormatVariable::new("index_format", "%s", defs(), false, false)
            .unwrap()
            .with_validator(Box::new(|v| {
                if v.as_str().contains("forbidden") {
                    bail!("forbidden token");
                }
                Ok(())
            }));
        assert!(var.string_set("%s forbidden").is_err());
        assert_eq!(var.string_get(), "%s");
    }

    #[test]
    fn equality_is_by_text_not_tree_identity() {
        let a = FormatValue::parse("%s", &defs()).unwrap();
        let b = FormatValue::parse("%s", &defs()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn native_set_moves_a_value_produced_elsewhere() {
        let mut a = FormatVariable::new("a", "%s", defs(), false, false).unwrap();
        let b = FormatVariable::new("b", "other: %s", defs(), false, false).unwrap();
        a.native_set(b.native_get()).unwrap();
        assert_eq!(a.string_get(), "other: %s");
    }

    #[test]
    fn string_plus_equals_concatenates_and_reparses() {
        let mut var = FormatVariable::new("a", "%s", defs(), false, false).unwrap();
        var.string_plus_equals(" (more)").unwrap();
        assert_eq!(var.string_get(), "%s (more)");
    }

    #[test]
    fn reset_restores_initial_text_after_a_set() {
        let mut var = FormatVariable::new("a", "%s", defs(), false, false).unwrap();
        var.string_set("changed: %s").unwrap();
        var.reset().unwrap();
        assert_eq!(var.string_get(), "%s");
    }

    #[test]
    fn startup_only_variable_rejects_writes_after_startup_ends() {
        let mut var = FormatVariable::new("a", "%s", defs(), false, true).unwrap();
        var.end_startup();
        assert!(var.string_set("%s changed").is_err());
        assert_eq!(var.string_get(), "%s");
    }

    #[test]
    fn startup_only_variable_accepts_writes_during_startup() {
        let mut var = FormatVariable::new("a", "%s", defs(), false, true).unwrap();
        var.string_set("%s changed").unwrap();
        assert_eq!(var.string_get(), "%s changed");
    }

    #[test]
    fn startup_only_variable_still_accepts_reset_after_startup_ends() {
        let mut var = FormatVariable::new("a", "%s", defs(), false, true).unwrap();
        var.string_set("%s changed").unwrap();
        var.end_startup();
        var.reset().unwrap();
        assert_eq!(var.string_get(), "%s");
    }

    #[test]
    fn set_logs_the_variable_name_and_new_value() {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let writer = LockedWriter(buf.clone());
        let subscriber = tracing_subscriber::fmt().with_writer(writer).finish();
        let mut var = FormatVariable::new("index_format", "%s", defs(), false, false).unwrap();
        tracing::subscriber::with_default(subscriber, || {
            var.string_set("changed: %s").unwrap();
        });
        let logged = String::from_utf8(buf.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("index_format"));
        assert!(logged.contains("changed: %s"));
    }
}
