//! Single-pass syntax highlighting for code blocks
//!
//! Every rule of the selected language contributes candidate tokens. Candidates are
//! stably sorted by start offset and accepted greedily, so rules collected earlier
//! (comments, then strings) win over later ones at the same position.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::html::escape_code;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    JavaScript,
    TypeScript,
    Python,
    Java,
    Cpp,
    CSharp,
    Html,
    Css,
    Json,
}

impl Language {
    pub const ALL: [Language; 9] = [
        Language::JavaScript,
        Language::TypeScript,
        Language::Python,
        Language::Java,
        Language::Cpp,
        Language::CSharp,
        Language::Html,
        Language::Css,
        Language::Json,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        let token = name.trim().to_lowercase();
        let language = match map_language_alias(&token) {
            "javascript" => Language::JavaScript,
            "typescript" => Language::TypeScript,
            "python" => Language::Python,
            "java" => Language::Java,
            "cpp" => Language::Cpp,
            "csharp" => Language::CSharp,
            "html" => Language::Html,
            "css" => Language::Css,
            "json" => Language::Json,
            _ => return None,
        };
        Some(language)
    }

    /// Unknown languages are highlighted with the javascript rules.
    pub fn resolve(name: &str) -> Self {
        Self::from_name(name).unwrap_or(Language::JavaScript)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Python => "python",
            Language::Java => "java",
            Language::Cpp => "cpp",
            Language::CSharp => "csharp",
            Language::Html => "html",
            Language::Css => "css",
            Language::Json => "json",
        }
    }
}

fn map_language_alias(token: &str) -> &str {
    match token {
        "js" | "jsx" | "mjs" => "javascript",
        "ts" | "tsx" => "typescript",
        "py" => "python",
        "c++" | "cpp" | "cxx" | "cc" => "cpp",
        "c#" | "cs" => "csharp",
        "htm" => "html",
        _ => token,
    }
}

/// Human readable label shown in the code block header.
pub fn language_display_name(name: &str) -> String {
    let token = name.trim().to_lowercase();
    let label = match map_language_alias(&token) {
        "javascript" => "JavaScript",
        "typescript" => "TypeScript",
        "python" => "Python",
        "java" => "Java",
        "cpp" => "C++",
        "csharp" => "C#",
        "php" => "PHP",
        "ruby" => "Ruby",
        "go" => "Go",
        "rust" => "Rust",
        "html" => "HTML",
        "css" => "CSS",
        "json" => "JSON",
        "xml" => "XML",
        "yaml" => "YAML",
        "bash" => "Bash/Shell",
        "sql" => "SQL",
        "markdown" => "Markdown",
        "plaintext" => "Plain Text",
        _ => return name.trim().to_uppercase(),
    };
    label.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword,
    Function,
    Operator,
    Comment,
    String,
    Number,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Keyword => "keyword",
            TokenKind::Function => "function",
            TokenKind::Operator => "operator",
            TokenKind::Comment => "comment",
            TokenKind::String => "string",
            TokenKind::Number => "number",
        }
    }
}

/// A highlighted span; `start..end` are byte offsets into the tokenized input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub value: &'a str,
    pub start: usize,
    pub end: usize,
}

struct LanguageRules {
    keywords: Vec<Regex>,
    /// Matches `name\s*(`; the token drops the trailing parenthesis.
    functions: Option<Regex>,
    operators: Option<Regex>,
    single_line_comment: Option<Regex>,
    multi_line_comment: Option<Regex>,
}

const JS_KEYWORDS: &[&str] = &[
    "function", "const", "let", "var", "if", "else", "for", "while", "return", "import", "export",
    "class", "new", "try", "catch", "finally", "throw", "async", "await", "this", "super",
    "extends", "static",
];

const TS_KEYWORDS: &[&str] = &[
    "function", "const", "let", "var", "if", "else", "for", "while", "return", "import", "export",
    "class", "new", "interface", "type", "enum", "namespace", "module", "declare", "public",
    "private", "protected", "readonly", "static", "abstract", "extends", "implements", "try",
    "catch", "finally", "throw", "async", "await", "this", "super",
];

const PYTHON_KEYWORDS: &[&str] = &[
    "def", "class", "if", "else", "elif", "for", "while", "return", "import", "from", "as", "try",
    "except", "finally", "raise", "with", "yield", "lambda", "and", "or", "not", "in", "is",
    "None", "True", "False", "self", "pass", "break", "continue", "global", "nonlocal",
];

const JAVA_KEYWORDS: &[&str] = &[
    "public", "private", "protected", "class", "interface", "abstract", "final", "static",
    "synchronized", "volatile", "transient", "native", "strictfp", "if", "else", "for", "while",
    "do", "switch", "case", "default", "break", "continue", "return", "try", "catch", "finally",
    "throw", "throws", "import", "package", "extends", "implements", "new", "this", "super",
    "null", "true", "false", "void", "int", "long", "short", "byte", "float", "double", "char",
    "boolean",
];

const CPP_KEYWORDS: &[&str] = &[
    "int", "float", "double", "char", "bool", "void", "long", "short", "unsigned", "signed",
    "const", "static", "extern", "register", "auto", "volatile", "if", "else", "for", "while",
    "do", "switch", "case", "default", "break", "continue", "return", "goto", "sizeof",
    "typedef", "struct", "union", "enum", "class", "public", "private", "protected", "virtual",
    "inline", "friend", "template", "typename", "namespace", "using", "new", "delete", "this",
    "true", "false", "nullptr",
];

const CSHARP_KEYWORDS: &[&str] = &[
    "public", "private", "protected", "internal", "class", "interface", "struct", "enum",
    "namespace", "using", "abstract", "virtual", "override", "sealed", "static", "readonly",
    "const", "volatile", "if", "else", "for", "foreach", "while", "do", "switch", "case",
    "default", "break", "continue", "return", "goto", "try", "catch", "finally", "throw", "new",
    "this", "base", "null", "true", "false", "void", "int", "long", "short", "byte", "float",
    "double", "decimal", "char", "bool", "string", "object",
];

const CSS_KEYWORDS: &[&str] = &[
    "important", "inherit", "initial", "unset", "auto", "none", "normal", "bold", "italic",
    "underline", "solid", "dashed", "dotted", "block", "inline", "flex", "grid", "absolute",
    "relative", "fixed", "static", "sticky",
];

const JSON_KEYWORDS: &[&str] = &["true", "false", "null"];

const C_LIKE_OPERATORS: &str = r"[+\-*/%=!<>&|^~?:]";
const JS_FUNCTIONS: &str = r"\b[a-zA-Z_$][a-zA-Z0-9_$]*\s*\(";
const C_FUNCTIONS: &str = r"\b[a-zA-Z_][a-zA-Z0-9_]*\s*\(";
const C_SINGLE_LINE_COMMENT: &str = r"//[^\r\n]*";
const C_MULTI_LINE_COMMENT: &str = r"(?s)/\*.*?\*/";

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("Invalid highlight regex")
}

fn keyword_patterns(keywords: &[&str]) -> Vec<Regex> {
    keywords
        .iter()
        .map(|keyword| compile(&format!(r"\b{}\b", regex::escape(keyword))))
        .collect()
}

fn c_like(keywords: &[&str], functions: &str) -> LanguageRules {
    LanguageRules {
        keywords: keyword_patterns(keywords),
        functions: Some(compile(functions)),
        operators: Some(compile(C_LIKE_OPERATORS)),
        single_line_comment: Some(compile(C_SINGLE_LINE_COMMENT)),
        multi_line_comment: Some(compile(C_MULTI_LINE_COMMENT)),
    }
}

fn build_rules(language: Language) -> LanguageRules {
    match language {
        Language::JavaScript => c_like(JS_KEYWORDS, JS_FUNCTIONS),
        Language::TypeScript => c_like(TS_KEYWORDS, JS_FUNCTIONS),
        Language::Java => c_like(JAVA_KEYWORDS, JS_FUNCTIONS),
        Language::Cpp => c_like(CPP_KEYWORDS, C_FUNCTIONS),
        Language::CSharp => c_like(CSHARP_KEYWORDS, C_FUNCTIONS),
        Language::Python => LanguageRules {
            keywords: keyword_patterns(PYTHON_KEYWORDS),
            functions: Some(compile(C_FUNCTIONS)),
            operators: Some(compile(r"[+\-*/%=!<>&|^~]")),
            single_line_comment: Some(compile(r"#[^\r\n]*")),
            multi_line_comment: Some(compile(r#"(?s)""".*?"""|'''.*?'''"#)),
        },
        Language::Html => LanguageRules {
            keywords: Vec::new(),
            functions: None,
            operators: None,
            single_line_comment: None,
            multi_line_comment: Some(compile(r"(?s)<!--.*?-->")),
        },
        Language::Css => LanguageRules {
            keywords: keyword_patterns(CSS_KEYWORDS),
            functions: Some(compile(r"\b[a-zA-Z-]+\s*\(")),
            operators: Some(compile(r"[:{};]")),
            single_line_comment: None,
            multi_line_comment: Some(compile(C_MULTI_LINE_COMMENT)),
        },
        Language::Json => LanguageRules {
            keywords: keyword_patterns(JSON_KEYWORDS),
            functions: None,
            operators: Some(compile(r"[:{}\[\],]")),
            single_line_comment: None,
            multi_line_comment: None,
        },
    }
}

static RULES: LazyLock<HashMap<Language, LanguageRules>> = LazyLock::new(|| {
    Language::ALL
        .into_iter()
        .map(|language| (language, build_rules(language)))
        .collect()
});

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\b[0-9]+\.?[0-9]*(?:[eE][+-]?[0-9]+)?\b"));
static HTML_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"</?[a-zA-Z][a-zA-Z0-9]*(?:\s[^>]*)?/?>"));
static HTML_TAG_NAME_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"</?[a-zA-Z][a-zA-Z0-9]*"));
static HTML_ATTRIBUTE_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"\s([a-zA-Z-]+)\s*="));
static CSS_SELECTOR_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"([.#]?[a-zA-Z][a-zA-Z0-9-]*)\s*\{"));
static CSS_PROPERTY_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"\b[a-zA-Z-]+\s*:"));

/// Returns the accepted, non-overlapping tokens in ascending order.
pub fn tokenize<'a>(code: &'a str, language: &str) -> Vec<Token<'a>> {
    let language = Language::resolve(language);
    let Some(rules) = RULES.get(&language) else {
        return Vec::new();
    };
    let mut candidates = Vec::new();

    if let Some(regex) = &rules.multi_line_comment {
        push_matches(code, regex, TokenKind::Comment, &mut candidates);
    }
    if let Some(regex) = &rules.single_line_comment {
        push_matches(code, regex, TokenKind::Comment, &mut candidates);
    }
    if language == Language::Html {
        push_html_tags(code, &mut candidates);
    } else {
        push_strings(code, &mut candidates);
    }
    if language == Language::Css {
        for captures in CSS_SELECTOR_RE.captures_iter(code) {
            if let Some(selector) = captures.get(1) {
                push_span(code, TokenKind::Keyword, selector.start(), selector.end(), &mut candidates);
            }
        }
        push_trimmed_matches(code, &CSS_PROPERTY_RE, TokenKind::Function, &mut candidates);
    }
    push_matches(code, &NUMBER_RE, TokenKind::Number, &mut candidates);
    if let Some(regex) = &rules.functions {
        push_trimmed_matches(code, regex, TokenKind::Function, &mut candidates);
    }
    for regex in &rules.keywords {
        push_matches(code, regex, TokenKind::Keyword, &mut candidates);
    }
    if let Some(regex) = &rules.operators {
        push_matches(code, regex, TokenKind::Operator, &mut candidates);
    }

    candidates.sort_by_key(|token| token.start);
    let mut accepted = Vec::with_capacity(candidates.len());
    let mut last_end = 0;
    for token in candidates {
        if token.start >= last_end {
            last_end = token.end;
            accepted.push(token);
        }
    }
    accepted
}

/// Highlights one line (or any snippet) into escaped HTML.
pub fn highlight_line(code: &str, language: &str) -> String {
    let mut out = String::with_capacity(code.len() * 2);
    let mut position = 0;
    for token in tokenize(code, language) {
        if token.start > position {
            out.push_str(&escape_code(&code[position..token.start]));
        }
        out.push_str(&format!(
            "<span class=\"token-{}\">{}</span>",
            token.kind.as_str(),
            escape_code(token.value)
        ));
        position = token.end;
    }
    if position < code.len() {
        out.push_str(&escape_code(&code[position..]));
    }
    out
}

fn push_span<'a>(code: &'a str, kind: TokenKind, start: usize, end: usize, out: &mut Vec<Token<'a>>) {
    out.push(Token {
        kind,
        value: &code[start..end],
        start,
        end,
    });
}

fn push_matches<'a>(code: &'a str, regex: &Regex, kind: TokenKind, out: &mut Vec<Token<'a>>) {
    for found in regex.find_iter(code) {
        push_span(code, kind, found.start(), found.end(), out);
    }
}

/// For patterns ending in a one-byte terminator (`(` or `:`) that is not part of the token.
fn push_trimmed_matches<'a>(
    code: &'a str,
    regex: &Regex,
    kind: TokenKind,
    out: &mut Vec<Token<'a>>,
) {
    for found in regex.find_iter(code) {
        push_span(code, kind, found.start(), found.end() - 1, out);
    }
}

fn push_strings<'a>(code: &'a str, out: &mut Vec<Token<'a>>) {
    let mut position = 0;
    while let Some(found) = code[position..].find(['"', '\'', '`']) {
        let start = position + found;
        match scan_quoted(code, start) {
            Some(end) => {
                push_span(code, TokenKind::String, start, end, out);
                position = end;
            }
            None => position = start + 1,
        }
    }
}

/// Scans a quoted literal opening at `start`; backslash escapes cannot span a line break.
fn scan_quoted(text: &str, start: usize) -> Option<usize> {
    let quote = text[start..].chars().next()?;
    let body_start = start + quote.len_utf8();
    let mut chars = text[body_start..].char_indices();
    while let Some((index, ch)) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some((_, escaped)) if !is_line_terminator(escaped) => continue,
                _ => return None,
            }
        }
        if ch == quote {
            return Some(body_start + index + ch.len_utf8());
        }
    }
    None
}

fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

fn push_html_tags<'a>(code: &'a str, out: &mut Vec<Token<'a>>) {
    for tag in HTML_TAG_RE.find_iter(code) {
        let tag_start = tag.start();
        let content = tag.as_str();

        if let Some(name) = HTML_TAG_NAME_RE.find(content) {
            push_span(code, TokenKind::Keyword, tag_start + name.start(), tag_start + name.end(), out);
        }
        for captures in HTML_ATTRIBUTE_RE.captures_iter(content) {
            if let Some(name) = captures.get(1) {
                push_span(code, TokenKind::Function, tag_start + name.start(), tag_start + name.end(), out);
            }
        }
        push_attribute_values(code, tag_start, content, out);

        if content.ends_with("/>") {
            push_span(code, TokenKind::Operator, tag.end() - 2, tag.end(), out);
        } else {
            push_span(code, TokenKind::Operator, tag.end() - 1, tag.end(), out);
        }
        push_span(code, TokenKind::Operator, tag_start, tag_start + 1, out);
    }
}

/// `=` followed by a quoted value; the value token keeps any whitespace after `=`.
fn push_attribute_values<'a>(code: &'a str, tag_start: usize, content: &str, out: &mut Vec<Token<'a>>) {
    let mut position = 0;
    while let Some(found) = content[position..].find('=') {
        let equals = position + found;
        let rest = &content[equals + 1..];
        let quote_at = equals + 1 + (rest.len() - rest.trim_start().len());
        let quoted = content[quote_at..].starts_with(['"', '\'']);
        match quoted.then(|| scan_quoted(content, quote_at)).flatten() {
            Some(end) => {
                push_span(code, TokenKind::Operator, tag_start + equals, tag_start + equals + 1, out);
                push_span(code, TokenKind::String, tag_start + equals + 1, tag_start + end, out);
                position = end;
            }
            None => position = equals + 1,
        }
    }
}

/// Parses `"1,3-5,8"` into `[1, 3, 4, 5, 8]`, keeping only lines up to `line_count`.
///
/// Each part is read like a lenient integer prefix (`"4th"` is 4); unreadable parts
/// and inverted ranges are skipped, duplicates keep their first position.
pub fn parse_highlight_lines(spec: &str, line_count: usize) -> Vec<usize> {
    let mut lines: Vec<usize> = Vec::new();
    let mut seen = HashSet::new();
    let mut push = |line: usize| {
        if seen.insert(line) {
            lines.push(line);
        }
    };
    let last = i64::try_from(line_count).unwrap_or(i64::MAX);
    for part in spec.split(',').map(str::trim).filter(|part| !part.is_empty()) {
        if part.contains('-') {
            let mut bounds = part.split('-').map(|bound| parse_int_prefix(bound.trim()));
            let (Some(Some(start)), Some(Some(end))) = (bounds.next(), bounds.next()) else {
                continue;
            };
            if start > end || start < 0 {
                continue;
            }
            for line in start..=end.min(last) {
                push(line as usize);
            }
        } else if let Some(line) = parse_int_prefix(part) {
            if (0..=last).contains(&line) {
                push(line as usize);
            }
        }
    }
    lines
}

fn parse_int_prefix(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let (radix, digits) = match digits.get(..2) {
        Some("0x") | Some("0X") => (16, &digits[2..]),
        _ => (10, digits),
    };
    let end = digits
        .find(|ch: char| !ch.is_digit(radix))
        .unwrap_or(digits.len());
    let value = i64::from_str_radix(&digits[..end], radix).ok()?;
    Some(if negative { -value } else { value })
}
