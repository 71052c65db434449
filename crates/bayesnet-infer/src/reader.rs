//! XMLBIF network reader.
//!
//! Reads the subset of XMLBIF needed for discrete networks:
//!
//! ```xml
//! <VARIABLE TYPE="nature">
//!   <NAME>Alarm</NAME>
//!   <OUTCOME>T</OUTCOME>
//!   <OUTCOME>F</OUTCOME>
//! </VARIABLE>
//! <DEFINITION>
//!   <FOR>Alarm</FOR>
//!   <GIVEN>Burglary</GIVEN>
//!   <GIVEN>Earthquake</GIVEN>
//!   <TABLE>0.95 0.05 0.94 0.06 0.29 0.71 0.001 0.999</TABLE>
//! </DEFINITION>
//! ```
//!
//! `VARIABLE` and `DEFINITION` elements are collected wherever they appear.
//! `PROBABILITY` is accepted as an alias of `DEFINITION`. Attributes,
//! `PROPERTY` elements, comments, processing instructions and `DOCTYPE`
//! declarations are ignored.

use std::path::Path;

use crate::error::{BnError, Result};
use crate::network::{CptDefinition, NetworkBuilder, NetworkStructure};

/// Parse an XMLBIF document into a validated network.
pub fn parse_network(text: &str) -> Result<NetworkStructure> {
    let root = Scanner::new(text).document()?;

    let mut builder = NetworkBuilder::new();
    let mut variables = 0usize;
    let mut definitions = 0usize;

    root.visit(&mut |element| {
        match element.name.as_str() {
            "VARIABLE" => {
                let name = element.required_text("NAME", "VARIABLE")?;
                let outcomes: Vec<String> = element
                    .children_named("OUTCOME")
                    .map(|o| o.text.trim().to_string())
                    .collect();
                builder.variable(name, outcomes);
                variables += 1;
            }
            "DEFINITION" | "PROBABILITY" => {
                builder.definition(definition(element)?);
                definitions += 1;
            }
            _ => {}
        }
        Ok(())
    })?;

    tracing::debug!(variables, definitions, "parsed XMLBIF document");
    builder.build()
}

/// Read and parse an XMLBIF file.
pub fn load_network(path: impl AsRef<Path>) -> Result<NetworkStructure> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    tracing::info!(path = %path.display(), "loading network");
    parse_network(&text)
}

fn definition(element: &Element) -> Result<CptDefinition> {
    let variable = element.required_text("FOR", &element.name)?;
    let parents = element
        .children_named("GIVEN")
        .map(|g| g.text.trim().to_string())
        .collect();

    let table_text = element.required_text("TABLE", &element.name)?;
    let table = table_text
        .split_whitespace()
        .map(|token| {
            token.parse::<f64>().map_err(|_| {
                BnError::NetworkFormat(format!(
                    "table of {} contains non-numeric entry '{}'",
                    variable, token
                ))
            })
        })
        .collect::<Result<Vec<f64>>>()?;

    Ok(CptDefinition {
        variable,
        parents,
        table,
    })
}

/// Element tree node; text is the concatenation of direct text content.
#[derive(Debug, Default)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn children_named<'e>(&'e self, name: &'e str) -> impl Iterator<Item = &'e Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    fn required_text(&self, child: &str, parent: &str) -> Result<String> {
        let text = self
            .children_named(child)
            .next()
            .map(|c| c.text.trim().to_string())
            .ok_or_else(|| {
                BnError::NetworkFormat(format!("<{}> without <{}>", parent, child))
            })?;
        if text.is_empty() {
            return Err(BnError::NetworkFormat(format!(
                "<{}> has an empty <{}>",
                parent, child
            )));
        }
        Ok(text)
    }

    /// Pre-order walk; a matched `VARIABLE` or `DEFINITION` is not descended
    /// into.
    fn visit<F>(&self, f: &mut F) -> Result<()>
    where
        F: FnMut(&Element) -> Result<()>,
    {
        for child in &self.children {
            match child.name.as_str() {
                "VARIABLE" | "DEFINITION" | "PROBABILITY" => f(child)?,
                _ => child.visit(f)?,
            }
        }
        Ok(())
    }
}

struct Scanner<'t> {
    text: &'t str,
    pos: usize,
}

impl<'t> Scanner<'t> {
    fn new(text: &'t str) -> Self {
        Self { text, pos: 0 }
    }

    fn rest(&self) -> &'t str {
        &self.text[self.pos..]
    }

    fn error(&self, message: impl std::fmt::Display) -> BnError {
        let line = self.text[..self.pos].matches('\n').count() + 1;
        BnError::NetworkFormat(format!("line {}: {}", line, message))
    }

    /// Parse the whole document into a synthetic root element.
    fn document(mut self) -> Result<Element> {
        let mut root = Element::default();
        loop {
            self.skip_misc()?;
            if self.rest().is_empty() {
                break;
            }
            if !self.rest().starts_with('<') {
                return Err(self.error("text outside of the root element"));
            }
            root.children.push(self.element()?);
        }
        if root.children.is_empty() {
            return Err(self.error("document has no elements"));
        }
        Ok(root)
    }

    /// Skip whitespace, comments, processing instructions and declarations.
    fn skip_misc(&mut self) -> Result<()> {
        loop {
            let trimmed = self.rest().trim_start();
            self.pos = self.text.len() - trimmed.len();
            if trimmed.starts_with("<?") {
                self.skip_past("?>")?;
            } else if trimmed.starts_with("<!--") {
                self.skip_past("-->")?;
            } else if trimmed.starts_with("<!") {
                self.skip_declaration()?;
            } else {
                return Ok(());
            }
        }
    }

    fn skip_past(&mut self, terminator: &str) -> Result<()> {
        match self.rest().find(terminator) {
            Some(offset) => {
                self.pos += offset + terminator.len();
                Ok(())
            }
            None => Err(self.error(format!("unterminated markup, expected '{}'", terminator))),
        }
    }

    /// `<!DOCTYPE ...>` possibly with an internal subset in brackets.
    fn skip_declaration(&mut self) -> Result<()> {
        let mut depth = 0usize;
        for (offset, ch) in self.rest().char_indices() {
            match ch {
                '[' => depth += 1,
                ']' => depth = depth.saturating_sub(1),
                '>' if depth == 0 => {
                    self.pos += offset + 1;
                    return Ok(());
                }
                _ => {}
            }
        }
        Err(self.error("unterminated declaration"))
    }

    /// Parse one element starting at `<`.
    fn element(&mut self) -> Result<Element> {
        let (name, self_closing) = self.open_tag()?;
        let mut element = Element {
            name,
            ..Element::default()
        };
        if self_closing {
            return Ok(element);
        }

        loop {
            let rest = self.rest();
            if rest.is_empty() {
                return Err(self.error(format!("<{}> is never closed", element.name)));
            }
            if rest.starts_with("</") {
                let close = self.close_tag()?;
                if close != element.name {
                    return Err(self.error(format!(
                        "</{}> does not match <{}>",
                        close, element.name
                    )));
                }
                return Ok(element);
            }
            if rest.starts_with("<!--") {
                self.skip_past("-->")?;
            } else if rest.starts_with("<![CDATA[") {
                self.pos += "<![CDATA[".len();
                let end = self
                    .rest()
                    .find("]]>")
                    .ok_or_else(|| self.error("unterminated CDATA section"))?;
                element.text.push_str(&self.rest()[..end]);
                self.pos += end + 3;
            } else if rest.starts_with("<?") {
                self.skip_past("?>")?;
            } else if rest.starts_with('<') {
                element.children.push(self.element()?);
            } else {
                let end = rest.find('<').unwrap_or(rest.len());
                element.text.push_str(&decode_entities(&rest[..end]));
                self.pos += end;
            }
        }
    }

    /// Returns the tag name and whether the tag is self-closing.
    fn open_tag(&mut self) -> Result<(String, bool)> {
        self.pos += 1;
        let name = self.name()?;

        let mut quote: Option<char> = None;
        for (offset, ch) in self.rest().char_indices() {
            match (quote, ch) {
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '"') | (None, '\'') => quote = Some(ch),
                (None, '>') => {
                    let self_closing = self.rest()[..offset].trim_end().ends_with('/');
                    self.pos += offset + 1;
                    return Ok((name, self_closing));
                }
                _ => {}
            }
        }
        Err(self.error(format!("unterminated tag <{}", name)))
    }

    fn close_tag(&mut self) -> Result<String> {
        self.pos += 2;
        let name = self.name()?;
        let rest = self.rest();
        let trimmed = rest.trim_start();
        if !trimmed.starts_with('>') {
            return Err(self.error(format!("malformed closing tag </{}", name)));
        }
        self.pos += rest.len() - trimmed.len() + 1;
        Ok(name)
    }

    fn name(&mut self) -> Result<String> {
        let rest = self.rest();
        let end = rest
            .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
            .unwrap_or(rest.len());
        if end == 0 {
            return Err(self.error("missing tag name"));
        }
        self.pos += end;
        Ok(rest[..end].to_string())
    }
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
