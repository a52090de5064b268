//! Template rendering with indentation tracking.
//!
//! Templates refer to variables as `$name$`; `$$` renders a literal `$`. Every line written
//! starts with the current indentation prefix, blank lines excepted.

use std::collections::BTreeMap;

use crate::{Error, Result};

/// Placeholder delimiter.
pub const DELIMITER: char = '$';

/// Indentation emitted per level.
const INDENT: &str = "  ";

/// Template variables, keyed by placeholder name.
pub type Vars = BTreeMap<String, String>;

/// Builds a [`Vars`] map from `name => value` pairs.
///
/// ```
/// let vars = stubgen::vars! { "name" => "HelloReply", "type" => "::helloworld::HelloReply" };
/// assert_eq!("HelloReply", vars["name"]);
/// ```
#[macro_export]
macro_rules! vars {
    ($($name:expr => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut vars = $crate::printer::Vars::new();
        $(vars.insert(
            ::std::string::String::from($name),
            ::std::string::ToString::to_string(&$value),
        );)*
        vars
    }};
}

pub trait Printer {
    /// Substitutes `vars` into `template` and appends the result.
    ///
    /// Nothing is appended when the template refers to a name missing from `vars`.
    fn print_vars(&mut self, vars: &Vars, template: &str) -> Result<()>;

    /// Appends `text`, which must not contain placeholders.
    fn print(&mut self, text: &str) -> Result<()> {
        self.print_vars(&Vars::new(), text)
    }

    fn indent(&mut self);

    /// # Panics
    ///
    /// Panics if the indentation is already at zero.
    fn outdent(&mut self);

    fn indent_level(&self) -> usize;
}

/// A [`Printer`] appending to a borrowed `String`.
pub struct StringPrinter<'a> {
    buf: &'a mut String,
    indent: usize,
    at_line_start: bool,
}

impl<'a> StringPrinter<'a> {
    pub fn new(buf: &'a mut String) -> Self {
        let at_line_start = buf.is_empty() || buf.ends_with('\n');
        StringPrinter {
            buf,
            indent: 0,
            at_line_start,
        }
    }

    fn write_line_fragment(&mut self, fragment: &str) {
        if fragment.is_empty() {
            return;
        }
        if self.at_line_start {
            for _ in 0..self.indent {
                self.buf.push_str(INDENT);
            }
            self.at_line_start = false;
        }
        self.buf.push_str(fragment);
    }

    fn write(&mut self, text: &str) {
        let mut lines = text.split('\n').peekable();
        while let Some(line) = lines.next() {
            self.write_line_fragment(line);
            if lines.peek().is_some() {
                self.buf.push('\n');
                self.at_line_start = true;
            }
        }
    }
}

impl Printer for StringPrinter<'_> {
    fn print_vars(&mut self, vars: &Vars, template: &str) -> Result<()> {
        let rendered = render(template, vars)?;
        self.write(&rendered);
        Ok(())
    }

    fn indent(&mut self) {
        self.indent += 1;
    }

    fn outdent(&mut self) {
        assert!(self.indent > 0, "outdent below zero");
        self.indent -= 1;
    }

    fn indent_level(&self) -> usize {
        self.indent
    }
}

/// Substitutes `vars` into `template`.
pub fn render(template: &str, vars: &Vars) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(DELIMITER) {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after
            .find(DELIMITER)
            .ok_or_else(|| Error::UnterminatedPlaceholder {
                template: template.to_string(),
            })?;
        let name = &after[..end];
        if name.is_empty() {
            out.push(DELIMITER);
        } else {
            let value = vars
                .get(name)
                .ok_or_else(|| Error::UnresolvedPlaceholder {
                    name: name.to_string(),
                    template: template.to_string(),
                })?;
            out.push_str(value);
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);

    Ok(out)
}
