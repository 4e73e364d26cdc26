//! ArgSchema / ArgBinder.
//!
//! A single declarative per-command argument schema drives CLI token
//! coercion, default/last-value substitution, and (optionally) writing
//! into a target FPS. The coercion table is one match over
//! `(TokenKind, ExpectedKind)` returning a coerced value — table-driven,
//! not a hand-written parser per command.

use std::collections::HashMap;

use crate::error::UserError;
use crate::value::ValueKind;

/// Raw token kind as produced by the upstream lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Float(f64),
    Int(i64),
    /// A bareword that names a known variable (resolves through
    /// [`VariableResolver`]).
    StrVariable(String),
    /// A bareword that does not name a known variable.
    StrLiteral(String),
    ImageRef(String),
    CommandWord(String),
    /// A raw, not-yet-lexed token: parses to the target kind, falling
    /// back to pass-through for string kinds.
    Raw(String),
}

/// One token from the tokenizer: its kind plus the literal text, used for
/// the `"?"` and `"."` sentinel checks which operate on raw text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self { kind, text: text.into() }
    }
}

/// Coercion target, collapsing [`ValueKind`] into the five columns of the
/// coercion table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedKind {
    Float,
    Int,
    StrNotImg,
    Img,
    Str,
}

impl ExpectedKind {
    pub fn from_value_kind(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Float64 | ValueKind::Float32 => ExpectedKind::Float,
            ValueKind::Int64 | ValueKind::OnOff => ExpectedKind::Int,
            ValueKind::StreamName => ExpectedKind::Img,
            ValueKind::String | ValueKind::FpsName => ExpectedKind::Str,
            ValueKind::Filename
            | ValueKind::FitsFilename
            | ValueKind::ExecFilename
            | ValueKind::Dirname
            | ValueKind::Pid
            | ValueKind::Timespec
            | ValueKind::Undef => ExpectedKind::StrNotImg,
        }
    }
}

/// The coerced, typed result of binding one token against one descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum CoercedValue {
    Float(f64),
    Int(i64),
    Str(String),
    ImageRef(String),
}

/// Resolves a bareword into a numeric value, for the "resolvable
/// variable" coercion row.
pub trait VariableResolver {
    fn resolve_numeric(&self, name: &str) -> Option<f64>;
}

/// A resolver that never resolves anything (used when the caller has no
/// variable namespace, e.g. unit tests).
pub struct NoVariables;
impl VariableResolver for NoVariables {
    fn resolve_numeric(&self, _name: &str) -> Option<f64> {
        None
    }
}

/// Coerce one token against an expected kind using the coercion table.
pub fn coerce(
    token: &TokenKind,
    expected: ExpectedKind,
    is_onoff: bool,
    resolver: &dyn VariableResolver,
) -> Result<CoercedValue, UserError> {
    use CoercedValue as C;
    use ExpectedKind as E;
    use TokenKind as T;

    let mismatch = |got: &str| UserError::ArgTypeMismatch {
        arg: token_text(token),
        expected: format!("{expected:?}"),
        got: got.to_string(),
    };

    match (token, expected) {
        (T::Float(f), E::Float) => Ok(C::Float(*f)),
        (T::Float(f), E::Int) => Ok(C::Int(f.round() as i64)),
        (T::Float(_), E::StrNotImg | E::Img | E::Str) => Err(mismatch("float")),

        (T::Int(i), E::Float) => Ok(C::Float(*i as f64)),
        (T::Int(i), E::Int) => Ok(C::Int(*i)),
        (T::Int(_), E::StrNotImg | E::Img | E::Str) => Err(mismatch("int")),

        (T::StrVariable(name), E::Float) => resolver
            .resolve_numeric(name)
            .map(C::Float)
            .ok_or_else(|| mismatch("unresolvable variable")),
        (T::StrVariable(name), E::Int) => resolver
            .resolve_numeric(name)
            .map(|v| C::Int(v as i64))
            .ok_or_else(|| mismatch("unresolvable variable")),
        (T::StrVariable(name), E::StrNotImg | E::Str) => Ok(C::Str(name.clone())),
        (T::StrVariable(_), E::Img) => Err(mismatch("variable")),

        (T::StrLiteral(_), E::Float) => Err(mismatch("literal string")),
        (T::StrLiteral(s), E::Int) if is_onoff => parse_onoff(s).map(C::Int),
        (T::StrLiteral(_), E::Int) => Err(mismatch("literal string")),
        (T::StrLiteral(s), E::StrNotImg | E::Str) => Ok(C::Str(s.clone())),
        (T::StrLiteral(_), E::Img) => Err(mismatch("literal string")),

        (T::ImageRef(_), E::Float | E::Int | E::StrNotImg) => Err(mismatch("image reference")),
        (T::ImageRef(s), E::Img | E::Str) => Ok(C::ImageRef(s.clone())),

        (T::CommandWord(_), E::Float) => Err(mismatch("command word")),
        (T::CommandWord(s), E::Int) if is_onoff => parse_onoff(s).map(C::Int),
        (T::CommandWord(_), E::Int | E::StrNotImg | E::Img) => Err(mismatch("command word")),
        (T::CommandWord(s), E::Str) => Ok(C::Str(s.clone())),

        (T::Raw(s), E::Float) => s.parse().map(C::Float).map_err(|_| mismatch("raw")),
        (T::Raw(s), E::Int) => s.parse().map(C::Int).map_err(|_| mismatch("raw")),
        (T::Raw(s), E::StrNotImg | E::Str) => Ok(C::Str(s.clone())),
        (T::Raw(s), E::Img) => Ok(C::ImageRef(s.clone())),
    }
}

fn parse_onoff(s: &str) -> Result<i64, UserError> {
    match s {
        "on" | "ON" => Ok(1),
        "off" | "OFF" => Ok(0),
        other => Err(UserError::ArgTypeMismatch {
            arg: other.to_string(),
            expected: "OnOff".to_string(),
            got: "non on/off literal".to_string(),
        }),
    }
}

fn token_text(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Float(f) => f.to_string(),
        TokenKind::Int(i) => i.to_string(),
        TokenKind::StrVariable(s)
        | TokenKind::StrLiteral(s)
        | TokenKind::ImageRef(s)
        | TokenKind::CommandWord(s)
        | TokenKind::Raw(s) => s.clone(),
    }
}

/// Per-descriptor binding flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DescriptorFlags {
    /// Not taken from the command line.
    pub nocli: bool,
    /// Not written into the FPS.
    pub nofps: bool,
}

/// One entry in a command's declarative argument schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgDescriptor {
    pub fps_tag: String,
    pub description: String,
    pub expected_kind: ValueKind,
    pub flags: DescriptorFlags,
}

/// A command's ordered argument schema.
pub type ArgSchema = Vec<ArgDescriptor>;

/// Per-command last-value store: most recent successful binding per tag,
/// used to substitute `"."` tokens.
#[derive(Debug, Clone, Default)]
pub struct LastValueStore {
    values: HashMap<String, CoercedValue>,
}

impl LastValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, tag: &str) -> Option<&CoercedValue> {
        self.values.get(tag)
    }

    pub fn set(&mut self, tag: impl Into<String>, value: CoercedValue) {
        self.values.insert(tag.into(), value);
    }
}

/// Outcome of one [`bind`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum BindOutcome {
    /// Positional-mode success: one coerced value per non-`NOCLI` descriptor.
    Bound(Vec<(String, CoercedValue)>),
    /// Argument-1 keyword mode succeeded (sentinel `FUNCPARAMSET`).
    SingleParamSet { tag: String, value: CoercedValue },
    /// A `"?"` token was seen; help was requested (sentinel `HELP`).
    Help,
}

/// Error binding a token sequence against a schema.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BindError {
    #[error("missing argument for keyword-mode set of '{0}'")]
    MissingKeywordValue(String),
    #[error("missing argument for '{0}' with no last-value to substitute")]
    NoLastValue(String),
    #[error(transparent)]
    Coercion(#[from] UserError),
}

/// Bind a token sequence against `schema`: keyword mode if the first
/// token names a descriptor, positional mode otherwise.
pub fn bind(
    schema: &ArgSchema,
    tokens: &[Token],
    last_values: &mut LastValueStore,
    resolver: &dyn VariableResolver,
) -> Result<BindOutcome, BindError> {
    // `?` anywhere stops processing and reports help.
    if tokens.iter().any(|t| t.text == "?") {
        return Ok(BindOutcome::Help);
    }

    // Argument-1 keyword mode.
    if let Some(first) = tokens.first() {
        if let Some(descriptor) = schema.iter().find(|d| d.fps_tag == first.text) {
            let Some(second) = tokens.get(1) else {
                return Err(BindError::MissingKeywordValue(descriptor.fps_tag.clone()));
            };
            let is_onoff = descriptor.expected_kind == ValueKind::OnOff;
            let expected = ExpectedKind::from_value_kind(descriptor.expected_kind);
            let value = coerce(&second.kind, expected, is_onoff, resolver)?;
            last_values.set(descriptor.fps_tag.clone(), value.clone());
            return Ok(BindOutcome::SingleParamSet {
                tag: descriptor.fps_tag.clone(),
                value,
            });
        }
    }

    // Positional mode.
    let mut cli_tokens = tokens.iter();
    let mut bound = Vec::new();
    for descriptor in schema.iter().filter(|d| !d.flags.nocli) {
        let Some(tok) = cli_tokens.next() else {
            break;
        };
        let is_onoff = descriptor.expected_kind == ValueKind::OnOff;
        let expected = ExpectedKind::from_value_kind(descriptor.expected_kind);

        let value = if tok.text == "." {
            last_values
                .get(&descriptor.fps_tag)
                .cloned()
                .ok_or_else(|| BindError::NoLastValue(descriptor.fps_tag.clone()))?
        } else {
            coerce(&tok.kind, expected, is_onoff, resolver)?
        };

        last_values.set(descriptor.fps_tag.clone(), value.clone());
        bound.push((descriptor.fps_tag.clone(), value));
    }

    Ok(BindOutcome::Bound(bound))
}

/// Commit a successful [`bind`] outcome into the FPS: writes every bound
/// tag via its kind-specific setter, skipping descriptors flagged `NOFPS`.
/// The same tokens that set a command's positional defaults are the ones
/// persisted into the parameter store.
pub fn commit(
    schema: &ArgSchema,
    outcome: &BindOutcome,
    fps: &mut crate::fps::Fps,
) -> Result<(), crate::error::FpsOpError> {
    match outcome {
        BindOutcome::Bound(values) => {
            for (tag, value) in values {
                commit_one(schema, tag, value, fps)?;
            }
            Ok(())
        }
        BindOutcome::SingleParamSet { tag, value } => commit_one(schema, tag, value, fps),
        BindOutcome::Help => Ok(()),
    }
}

fn commit_one(
    schema: &ArgSchema,
    tag: &str,
    value: &CoercedValue,
    fps: &mut crate::fps::Fps,
) -> Result<(), crate::error::FpsOpError> {
    let nofps = schema.iter().find(|d| d.fps_tag == tag).is_some_and(|d| d.flags.nofps);
    if nofps {
        return Ok(());
    }
    let (_, param) = fps
        .find_by_path_mut(tag)
        .ok_or_else(|| crate::error::UserError::UnknownPath(tag.to_string()))?;
    match value {
        CoercedValue::Float(f) => param.write_numeric(*f)?,
        CoercedValue::Int(i) => param.write_numeric(*i as f64)?,
        CoercedValue::Str(s) | CoercedValue::ImageRef(s) => param.write_text(s)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> ArgSchema {
        vec![
            ArgDescriptor {
                fps_tag: "delay".into(),
                description: "delay".into(),
                expected_kind: ValueKind::Int64,
                flags: DescriptorFlags::default(),
            },
            ArgDescriptor {
                fps_tag: "gain".into(),
                description: "gain".into(),
                expected_kind: ValueKind::Float64,
                flags: DescriptorFlags::default(),
            },
            ArgDescriptor {
                fps_tag: "name".into(),
                description: "name".into(),
                expected_kind: ValueKind::String,
                flags: DescriptorFlags::default(),
            },
        ]
    }

    #[test]
    fn default_substitution_and_coercion() {
        let schema = schema();
        let mut last_values = LastValueStore::new();
        last_values.set("delay", CoercedValue::Int(42));

        let tokens = vec![
            Token::new(TokenKind::StrLiteral(".".into()), "."),
            Token::new(TokenKind::Float(1.5), "1.5"),
            Token::new(TokenKind::StrLiteral("xyz".into()), "xyz"),
        ];

        let outcome = bind(&schema, &tokens, &mut last_values, &NoVariables).unwrap();
        match outcome {
            BindOutcome::Bound(values) => {
                assert_eq!(values[0], ("delay".into(), CoercedValue::Int(42)));
                assert_eq!(values[1], ("gain".into(), CoercedValue::Float(1.5)));
                assert_eq!(values[2], ("name".into(), CoercedValue::Str("xyz".into())));
            }
            other => panic!("expected Bound, got {other:?}"),
        }
    }

    #[test]
    fn onoff_parsing() {
        let enable_on = coerce(
            &TokenKind::StrLiteral("ON".into()),
            ExpectedKind::Int,
            true,
            &NoVariables,
        )
        .unwrap();
        assert_eq!(enable_on, CoercedValue::Int(1));

        let err = coerce(
            &TokenKind::StrLiteral("maybe".into()),
            ExpectedKind::Int,
            true,
            &NoVariables,
        );
        assert!(err.is_err());
    }

    #[test]
    fn help_token_short_circuits() {
        let schema = schema();
        let mut last_values = LastValueStore::new();
        let tokens = vec![Token::new(TokenKind::StrLiteral("?".into()), "?")];
        assert_eq!(
            bind(&schema, &tokens, &mut last_values, &NoVariables).unwrap(),
            BindOutcome::Help
        );
    }

    fn test_fps() -> crate::fps::Fps {
        use crate::param::KeywordPath;
        let mut fps = crate::fps::Fps::create("myfps", "/tmp/myfps").unwrap();
        fps.add_entry(KeywordPath::parse("delay").unwrap(), ValueKind::Int64, "delay")
            .unwrap();
        fps.add_entry(KeywordPath::parse("gain").unwrap(), ValueKind::Float64, "gain")
            .unwrap();
        fps.add_entry(KeywordPath::parse("name").unwrap(), ValueKind::String, "name")
            .unwrap();
        fps
    }

    #[test]
    fn commit_writes_bound_values_into_the_fps() {
        let schema = schema();
        let outcome = BindOutcome::Bound(vec![
            ("delay".into(), CoercedValue::Int(9)),
            ("gain".into(), CoercedValue::Float(1.5)),
            ("name".into(), CoercedValue::Str("hello".into())),
        ]);
        let mut fps = test_fps();
        commit(&schema, &outcome, &mut fps).unwrap();

        let (_, delay) = fps.find_by_path("delay").unwrap();
        assert_eq!(delay.value.current_f64(), Some(9.0));
        let (_, name) = fps.find_by_path("name").unwrap();
        assert_eq!(name.value.current_text(), Some("hello"));
    }

    #[test]
    fn commit_skips_nofps_descriptors() {
        let mut schema = schema();
        schema[0].flags.nofps = true;
        let outcome = BindOutcome::SingleParamSet { tag: "delay".into(), value: CoercedValue::Int(9) };
        let mut fps = test_fps();
        commit(&schema, &outcome, &mut fps).unwrap();

        let (_, delay) = fps.find_by_path("delay").unwrap();
        assert_eq!(delay.value.current_f64(), Some(0.0));
    }

    #[test]
    fn keyword_mode_returns_single_param_set() {
        let schema = schema();
        let mut last_values = LastValueStore::new();
        let tokens = vec![
            Token::new(TokenKind::StrLiteral("delay".into()), "delay"),
            Token::new(TokenKind::Int(7), "7"),
        ];
        let outcome = bind(&schema, &tokens, &mut last_values, &NoVariables).unwrap();
        assert_eq!(
            outcome,
            BindOutcome::SingleParamSet {
                tag: "delay".into(),
                value: CoercedValue::Int(7)
            }
        );
    }
}
