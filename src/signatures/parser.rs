use crate::{
    signatures::{SignatureMethod, SignatureParameter, TypeConstraint},
    value::Value,
    Error::{RecursionLimit, SignatureParse},
    Result,
};

/// Maximum nesting depth for array literals in default values
const MAX_RECURSION_DEPTH: usize = 50;

/// Parser for textual parameter-list declarations
///
/// The accepted grammar is the one [`SignatureMethod`]'s `Display` implementation renders:
///
/// ```text
/// params     := "" | param ("," param)*
/// param      := [constraint] ["&"] name ["=" literal]
/// constraint := "array" | "callable" | ClassName
/// literal    := "null" | "true" | "false" | number | string | "[" [literal ("," literal)*] "]"
/// ```
///
/// # Example
///
/// ```rust
/// use anonymizer::signatures::SignatureParser;
///
/// let mut parser = SignatureParser::new("array &items, limit = 10");
/// let signature = parser.parse_method_signature()?;
/// assert_eq!(signature.params.len(), 2);
/// assert!(signature.params[0].by_ref);
/// # Ok::<(), anonymizer::Error>(())
/// ```
pub struct SignatureParser<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> SignatureParser<'a> {
    /// Create a new `SignatureParser` over a declaration
    ///
    /// ## Arguments
    /// * 'input' - The declaration to read from
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        SignatureParser {
            input,
            pos: 0,
            depth: 0,
        }
    }

    /// Parse the complete input as a parameter list
    ///
    /// # Errors
    /// Returns [`crate::Error::SignatureParse`] if the declaration is malformed, or
    /// [`crate::Error::RecursionLimit`] if array literals are nested too deeply.
    pub fn parse_method_signature(&mut self) -> Result<SignatureMethod> {
        let mut params: Vec<SignatureParameter> = Vec::new();

        self.skip_whitespace();
        if self.at_end() {
            return Ok(SignatureMethod::new(params));
        }

        loop {
            let start = self.pos;
            let param = self.parse_parameter()?;
            if params.iter().any(|existing| existing.name == param.name) {
                return Err(self.error_at(start, format!("duplicate parameter '{}'", param.name)));
            }
            params.push(param);

            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some(',') => {
                    self.bump();
                    self.skip_whitespace();
                }
                Some(c) => return Err(self.error(format!("expected ',' but found '{c}'"))),
            }
        }

        Ok(SignatureMethod::new(params))
    }

    fn parse_parameter(&mut self) -> Result<SignatureParameter> {
        let mut param = SignatureParameter::default();

        if self.peek() == Some('&') {
            self.bump();
            self.skip_whitespace();
            param.by_ref = true;
            param.name = self.parse_identifier()?;
        } else {
            let first = self.parse_identifier()?;
            self.skip_whitespace();
            match self.peek() {
                Some('&') => {
                    self.bump();
                    self.skip_whitespace();
                    param.constraint = Some(Self::constraint(first));
                    param.by_ref = true;
                    param.name = self.parse_identifier()?;
                }
                Some(c) if is_identifier_start(c) => {
                    param.constraint = Some(Self::constraint(first));
                    param.name = self.parse_identifier()?;
                }
                _ => param.name = first,
            }
        }

        self.skip_whitespace();
        if self.peek() == Some('=') {
            self.bump();
            self.skip_whitespace();
            param.default = Some(self.parse_value()?);
        }

        Ok(param)
    }

    fn constraint(name: String) -> TypeConstraint {
        match name.as_str() {
            "array" => TypeConstraint::Array,
            "callable" => TypeConstraint::Callable,
            _ => TypeConstraint::Class(name),
        }
    }

    fn parse_identifier(&mut self) -> Result<String> {
        let start = self.pos;
        match self.peek() {
            Some(c) if is_identifier_start(c) => self.bump(),
            Some(c) => return Err(self.error(format!("expected identifier but found '{c}'"))),
            None => return Err(self.error("expected identifier but reached end of input")),
        }
        while let Some(c) = self.peek() {
            if !is_identifier_part(c) {
                break;
            }
            self.bump();
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn parse_value(&mut self) -> Result<Value> {
        match self.peek() {
            Some('[') => self.parse_array(),
            Some('\'' | '"') => self.parse_string(),
            Some(c) if c == '-' || c.is_ascii_digit() => self.parse_number(),
            Some(c) if is_identifier_start(c) => {
                let start = self.pos;
                let word = self.parse_identifier()?;
                match word.as_str() {
                    "null" => Ok(Value::Null),
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    _ => Err(self.error_at(start, format!("'{word}' is not a literal"))),
                }
            }
            Some(c) => Err(self.error(format!("expected literal but found '{c}'"))),
            None => Err(self.error("expected literal but reached end of input")),
        }
    }

    fn parse_array(&mut self) -> Result<Value> {
        self.depth += 1;
        if self.depth >= MAX_RECURSION_DEPTH {
            return Err(RecursionLimit(MAX_RECURSION_DEPTH));
        }

        // opening bracket
        self.bump();
        let mut values = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some(']') {
                self.bump();
                break;
            }

            values.push(self.parse_value()?);

            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.bump(),
                Some(']') => {
                    self.bump();
                    break;
                }
                Some(c) => return Err(self.error(format!("expected ',' or ']' but found '{c}'"))),
                None => return Err(self.error("unterminated array literal")),
            }
        }

        self.depth -= 1;
        Ok(Value::Array(values))
    }

    fn parse_string(&mut self) -> Result<Value> {
        let start = self.pos;
        let Some(quote) = self.peek() else {
            return Err(self.error("expected string literal"));
        };
        self.bump();

        let mut text = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error_at(start, "unterminated string literal")),
                Some(c) if c == quote => {
                    self.bump();
                    break;
                }
                Some('\\') => {
                    self.bump();
                    match self.peek() {
                        Some('n') => text.push('\n'),
                        Some('t') => text.push('\t'),
                        Some(c @ ('\\' | '\'' | '"')) => text.push(c),
                        Some(c) => {
                            text.push('\\');
                            text.push(c);
                        }
                        None => return Err(self.error_at(start, "unterminated string literal")),
                    }
                    self.bump();
                }
                Some(c) => {
                    text.push(c);
                    self.bump();
                }
            }
        }

        Ok(Value::Str(text))
    }

    fn parse_number(&mut self) -> Result<Value> {
        let start = self.pos;
        let mut is_float = false;

        if self.peek() == Some('-') {
            self.bump();
        }
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' => {}
                '.' | 'e' | 'E' => is_float = true,
                '+' | '-' if matches!(self.previous(), Some('e' | 'E')) => {}
                _ => break,
            }
            self.bump();
        }

        let literal = &self.input[start..self.pos];
        if is_float {
            literal
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| self.error_at(start, format!("invalid number '{literal}'")))
        } else {
            literal
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| self.error_at(start, format!("invalid number '{literal}'")))
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn previous(&self) -> Option<char> {
        self.input[..self.pos].chars().next_back()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.bump();
        }
    }

    fn error(&self, message: impl Into<String>) -> crate::Error {
        self.error_at(self.pos, message)
    }

    fn error_at(&self, position: usize, message: impl Into<String>) -> crate::Error {
        SignatureParse {
            message: message.into(),
            position,
        }
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '\\'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '\\' | '.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_parse_empty() {
        assert!(SignatureParser::new("").parse_method_signature().unwrap().is_empty());
        assert!(SignatureParser::new("   ").parse_method_signature().unwrap().is_empty());
    }

    #[test]
    fn test_parse_constraints_and_refs() {
        let signature = SignatureParser::new("array &items, callable cb, App\\Visitor v, &out")
            .parse_method_signature()
            .unwrap();

        assert_eq!(signature.params.len(), 4);
        assert_eq!(signature.params[0].constraint, Some(TypeConstraint::Array));
        assert!(signature.params[0].by_ref);
        assert_eq!(signature.params[0].name, "items");
        assert_eq!(signature.params[1].constraint, Some(TypeConstraint::Callable));
        assert_eq!(
            signature.params[2].constraint,
            Some(TypeConstraint::Class("App\\Visitor".to_string()))
        );
        assert_eq!(signature.params[3].constraint, None);
        assert!(signature.params[3].by_ref);
    }

    #[test]
    fn test_parse_defaults() {
        let signature = SignatureParser::new(
            "a = null, b = true, c = -12, d = 2.5, e = 'it\\'s', f = [1, [2, \"x\"]], g = []",
        )
        .parse_method_signature()
        .unwrap();

        let defaults: Vec<Value> = signature
            .params
            .iter()
            .map(|param| param.default.clone().unwrap())
            .collect();
        assert_eq!(
            defaults,
            vec![
                Value::Null,
                Value::Bool(true),
                Value::Int(-12),
                Value::Float(2.5),
                Value::from("it's"),
                Value::Array(vec![
                    Value::Int(1),
                    Value::Array(vec![Value::Int(2), Value::from("x")])
                ]),
                Value::Array(vec![]),
            ]
        );
    }

    #[test]
    fn test_parse_exponent() {
        let signature = SignatureParser::new("ratio = 1e-3")
            .parse_method_signature()
            .unwrap();
        assert_eq!(signature.params[0].default, Some(Value::Float(0.001)));
    }

    #[test]
    fn test_render_round_trip() {
        let declaration = "array &items = [], Countable c = null, limit = 10, name = 'x'";
        let signature = SignatureParser::new(declaration)
            .parse_method_signature()
            .unwrap();
        assert_eq!(signature.to_string(), declaration);
    }

    #[test]
    fn test_parse_errors() {
        let cases = [
            ("a,", 2),
            ("a b c", 4),
            ("= 1", 0),
            ("a = ", 4),
            ("a = 'open", 4),
            ("a = [1 2]", 7),
            ("a = maybe", 4),
        ];

        for (declaration, expected) in cases {
            match SignatureParser::new(declaration).parse_method_signature() {
                Err(Error::SignatureParse { position, .. }) => {
                    assert_eq!(position, expected, "wrong position for {declaration:?}")
                }
                other => panic!("expected parse error for {declaration:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_parse_duplicate_parameter() {
        let result = SignatureParser::new("a, b, a").parse_method_signature();
        assert!(matches!(result, Err(Error::SignatureParse { position: 6, .. })));
    }

    #[test]
    fn test_recursion_limit() {
        let declaration = format!("a = {}{}", "[".repeat(60), "]".repeat(60));
        let result = SignatureParser::new(&declaration).parse_method_signature();
        assert!(matches!(result, Err(Error::RecursionLimit(_))));
    }
}
