//! A small subset of CSS selectors.
//!
//! Supported: type (`div`), universal (`*`), id (`#menu`), class (`.modal`),
//! attribute presence (`[data-open]`) and equality (`[data-state=open]`,
//! quoted or bare), compounds of these (`div.modal[open]`) and comma lists.
//! Combinators are rejected.

use std::iter::Peekable;
use std::str::CharIndices;

use crate::HostError;

/// A parsed comma-separated selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
	compounds: Vec<Compound>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
	tag: Option<String>,
	id: Option<String>,
	classes: Vec<String>,
	attributes: Vec<AttributeTest>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeTest {
	name: String,
	value: Option<String>,
}

impl SelectorList {
	pub fn parse(selector: &str) -> Result<Self, HostError> {
		Parser::new(selector).parse_list()
	}

	/// Tests an element given its tag name and an attribute accessor.
	pub fn matches<'a>(&self, tag: &str, attribute: impl Fn(&str) -> Option<&'a str>) -> bool {
		self.compounds.iter().any(|c| c.matches(tag, &attribute))
	}
}

impl Compound {
	fn is_empty(&self) -> bool {
		self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attributes.is_empty()
	}

	fn matches<'a>(&self, tag: &str, attribute: &impl Fn(&str) -> Option<&'a str>) -> bool {
		if let Some(expected) = &self.tag {
			if expected != "*" && !expected.eq_ignore_ascii_case(tag) {
				return false;
			}
		}
		if let Some(id) = &self.id {
			if attribute("id") != Some(id.as_str()) {
				return false;
			}
		}
		if !self.classes.is_empty() {
			let class_attr = attribute("class").unwrap_or_default();
			if !self
				.classes
				.iter()
				.all(|class| class_attr.split_whitespace().any(|c| c == class))
			{
				return false;
			}
		}
		self.attributes.iter().all(|test| match (&test.value, attribute(test.name.as_str())) {
			(_, None) => false,
			(None, Some(_)) => true,
			(Some(expected), Some(actual)) => expected == actual,
		})
	}
}

struct Parser<'s> {
	source: &'s str,
	chars: Peekable<CharIndices<'s>>,
}

impl<'s> Parser<'s> {
	fn new(source: &'s str) -> Self {
		Self {
			source,
			chars: source.char_indices().peekable(),
		}
	}

	fn error(&self, reason: impl Into<String>) -> HostError {
		HostError::InvalidSelector {
			selector: self.source.to_string(),
			reason: reason.into(),
		}
	}

	fn skip_whitespace(&mut self) {
		while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
	}

	fn parse_list(mut self) -> Result<SelectorList, HostError> {
		let mut compounds = Vec::new();
		loop {
			self.skip_whitespace();
			let compound = self.parse_compound()?;
			if compound.is_empty() {
				return Err(self.error("empty selector"));
			}
			compounds.push(compound);
			self.skip_whitespace();
			match self.chars.next() {
				None => break,
				Some((_, ',')) => continue,
				Some((_, c)) if c == '>' || c == '+' || c == '~' => {
					return Err(self.error("combinators are not supported"));
				}
				Some((_, c)) if is_ident_char(c) || matches!(c, '#' | '.' | '[' | '*') => {
					return Err(self.error("combinators are not supported"));
				}
				Some((_, c)) => return Err(self.error(format!("unexpected '{c}'"))),
			}
		}
		Ok(SelectorList { compounds })
	}

	fn parse_compound(&mut self) -> Result<Compound, HostError> {
		let mut compound = Compound::default();
		if self.chars.next_if(|(_, c)| *c == '*').is_some() {
			compound.tag = Some("*".to_string());
		} else if self.chars.peek().is_some_and(|(_, c)| is_ident_char(*c)) {
			compound.tag = Some(self.ident()?);
		}
		while let Some((_, c)) = self.chars.peek().copied() {
			match c {
				'#' => {
					self.chars.next();
					compound.id = Some(self.ident()?);
				}
				'.' => {
					self.chars.next();
					compound.classes.push(self.ident()?);
				}
				'[' => {
					self.chars.next();
					compound.attributes.push(self.attribute_test()?);
				}
				_ => break,
			}
		}
		Ok(compound)
	}

	fn ident(&mut self) -> Result<String, HostError> {
		let mut out = String::new();
		while let Some((_, c)) = self.chars.next_if(|(_, c)| is_ident_char(*c)) {
			out.push(c);
		}
		if out.is_empty() {
			return Err(self.error("expected identifier"));
		}
		Ok(out)
	}

	fn attribute_test(&mut self) -> Result<AttributeTest, HostError> {
		self.skip_whitespace();
		let name = self.ident()?;
		self.skip_whitespace();
		let value = match self.chars.next() {
			Some((_, ']')) => return Ok(AttributeTest { name, value: None }),
			Some((_, '=')) => {
				self.skip_whitespace();
				self.attribute_value()?
			}
			_ => return Err(self.error("expected '=' or ']'")),
		};
		self.skip_whitespace();
		match self.chars.next() {
			Some((_, ']')) => Ok(AttributeTest {
				name,
				value: Some(value),
			}),
			_ => Err(self.error("unterminated attribute selector")),
		}
	}

	fn attribute_value(&mut self) -> Result<String, HostError> {
		let quote = match self.chars.peek().copied() {
			Some((_, q)) if q == '"' || q == '\'' => q,
			_ => return self.ident(),
		};
		self.chars.next();
		let mut out = String::new();
		loop {
			match self.chars.next() {
				Some((_, c)) if c == quote => return Ok(out),
				Some((_, c)) => out.push(c),
				None => return Err(self.error("unterminated string")),
			}
		}
	}
}

fn is_ident_char(c: char) -> bool {
	c.is_alphanumeric() || c == '-' || c == '_'
}
