//! In-memory SimpleDB client.
//!
//! [`MemorySimpleDb`] keeps domains and items in process memory and
//! understands the select dialect produced by the adapter:
//!
//! ```text
//! select * from `<domain>` [where <attr>="<value>" [and <attr>="<value>"]...]
//! ```
//!
//! Results are paged like the real service. Throttling can be simulated with
//! [`MemorySimpleDb::throttle_next`]; throttled requests are retried using the
//! configured [`Backoff`] before the client gives up.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use super::client::{Attributes, Backoff, ClientError, SelectItem, SelectOutput, SimpleDbApi};

/// Default number of items returned per select page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Debug, Default)]
struct MemoryState {
    domains: BTreeMap<String, BTreeMap<String, Attributes>>,
    pending_throttles: u32,
}

/// A SimpleDB client backed by process memory.
#[derive(Debug)]
pub struct MemorySimpleDb {
    state: Mutex<MemoryState>,
    backoff: Backoff,
    page_size: usize,
}

impl MemorySimpleDb {
    /// Creates an empty store that retries throttled requests with `backoff`.
    pub fn new(backoff: Backoff) -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            backoff,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Sets the number of items per select page.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Makes the next `count` requests fail with a throttling response.
    pub fn throttle_next(&self, count: u32) {
        self.state.lock().pending_throttles = count;
    }

    /// Returns the domain names currently present.
    pub fn domain_names(&self) -> Vec<String> {
        self.state.lock().domains.keys().cloned().collect()
    }

    /// Returns the number of items in a domain, or `None` if it is absent.
    pub fn item_count(&self, domain: &str) -> Option<usize> {
        self.state.lock().domains.get(domain).map(BTreeMap::len)
    }

    async fn admit(&self) -> Result<(), ClientError> {
        let mut delays = self.backoff.delays();
        loop {
            let throttled = {
                let mut state = self.state.lock();
                if state.pending_throttles > 0 {
                    state.pending_throttles -= 1;
                    true
                } else {
                    false
                }
            };
            if !throttled {
                return Ok(());
            }
            match delays.next() {
                Some(delay) => {
                    tracing::trace!("request throttled, retrying in {:?}", delay);
                    tokio::time::sleep(delay).await;
                }
                None => {
                    return Err(ClientError::Throttled(format!(
                        "gave up after waiting up to {:?}",
                        self.backoff.max_wait()
                    )));
                }
            }
        }
    }
}

#[async_trait]
impl SimpleDbApi for MemorySimpleDb {
    async fn list_domains(&self) -> Result<Vec<String>, ClientError> {
        self.admit().await?;
        Ok(self.domain_names())
    }

    async fn create_domain(&self, domain: &str) -> Result<(), ClientError> {
        self.admit().await?;
        if domain.is_empty() {
            return Err(ClientError::InvalidInput("domain name is empty".to_string()));
        }
        self.state
            .lock()
            .domains
            .entry(domain.to_string())
            .or_default();
        Ok(())
    }

    async fn delete_domain(&self, domain: &str) -> Result<(), ClientError> {
        self.admit().await?;
        self.state.lock().domains.remove(domain);
        Ok(())
    }

    async fn get_item(&self, domain: &str, key: &str) -> Result<Option<Attributes>, ClientError> {
        self.admit().await?;
        let state = self.state.lock();
        let items = state
            .domains
            .get(domain)
            .ok_or_else(|| ClientError::NoSuchDomain(domain.to_string()))?;
        Ok(items.get(key).cloned())
    }

    async fn put_item(
        &self,
        domain: &str,
        key: &str,
        attributes: Attributes,
    ) -> Result<(), ClientError> {
        self.admit().await?;
        if key.is_empty() {
            return Err(ClientError::InvalidInput("item name is empty".to_string()));
        }
        let mut state = self.state.lock();
        let items = state
            .domains
            .get_mut(domain)
            .ok_or_else(|| ClientError::NoSuchDomain(domain.to_string()))?;
        items.insert(key.to_string(), attributes);
        Ok(())
    }

    async fn delete_item(&self, domain: &str, key: &str) -> Result<(), ClientError> {
        self.admit().await?;
        let mut state = self.state.lock();
        let items = state
            .domains
            .get_mut(domain)
            .ok_or_else(|| ClientError::NoSuchDomain(domain.to_string()))?;
        items.remove(key);
        Ok(())
    }

    async fn select(
        &self,
        query: &str,
        next_token: Option<&str>,
    ) -> Result<SelectOutput, ClientError> {
        self.admit().await?;
        let parsed = parse_select(query)?;

        let start = match next_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| ClientError::InvalidInput(format!("bad next token: {token}")))?,
            None => 0,
        };

        let state = self.state.lock();
        let items = state
            .domains
            .get(&parsed.domain)
            .ok_or_else(|| ClientError::NoSuchDomain(parsed.domain.clone()))?;

        let matching: Vec<SelectItem> = items
            .iter()
            .filter(|(_, attributes)| parsed.matches(attributes))
            .map(|(name, attributes)| SelectItem {
                name: name.clone(),
                attributes: attributes.clone(),
            })
            .collect();

        let end = start.saturating_add(self.page_size).min(matching.len());
        let page = if start >= matching.len() {
            Vec::new()
        } else {
            matching[start..end].to_vec()
        };
        let next_token = (end < matching.len()).then(|| end.to_string());

        Ok(SelectOutput {
            items: page,
            next_token,
        })
    }
}

/// A parsed select expression.
#[derive(Debug, PartialEq)]
struct ParsedSelect {
    domain: String,
    conditions: Vec<(String, String)>,
}

impl ParsedSelect {
    fn matches(&self, attributes: &Attributes) -> bool {
        self.conditions.iter().all(|(name, expected)| {
            attributes
                .get(name)
                .map(|value| attribute_text(value) == *expected)
                .unwrap_or(false)
        })
    }
}

fn attribute_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_select(query: &str) -> Result<ParsedSelect, ClientError> {
    let mut cursor = Cursor::new(query);
    cursor.keyword("select")?;
    cursor.expect('*')?;
    cursor.keyword("from")?;
    let domain = cursor.quoted('`')?;

    let mut conditions = Vec::new();
    if !cursor.at_end() {
        cursor.keyword("where")?;
        loop {
            let name = cursor.attribute_name()?;
            cursor.expect('=')?;
            let value = cursor.quoted('"')?;
            conditions.push((name, value));
            if cursor.at_end() {
                break;
            }
            cursor.keyword("and")?;
        }
    }

    Ok(ParsedSelect { domain, conditions })
}

struct Cursor<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    fn error(&self, message: &str) -> ClientError {
        ClientError::InvalidQuery(format!("{message} in `{}`", self.input))
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
    }

    fn at_end(&mut self) -> bool {
        self.skip_whitespace();
        self.chars.peek().is_none()
    }

    fn expect(&mut self, expected: char) -> Result<(), ClientError> {
        self.skip_whitespace();
        match self.chars.next() {
            Some((_, c)) if c == expected => Ok(()),
            _ => Err(self.error(&format!("expected '{expected}'"))),
        }
    }

    fn word(&mut self) -> String {
        self.skip_whitespace();
        let mut word = String::new();
        while let Some((_, c)) = self
            .chars
            .next_if(|(_, c)| c.is_ascii_alphanumeric() || *c == '_')
        {
            word.push(c);
        }
        word
    }

    fn keyword(&mut self, keyword: &str) -> Result<(), ClientError> {
        let word = self.word();
        if word.eq_ignore_ascii_case(keyword) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{keyword}'")))
        }
    }

    fn attribute_name(&mut self) -> Result<String, ClientError> {
        self.skip_whitespace();
        if matches!(self.chars.peek(), Some((_, '`'))) {
            return self.quoted('`');
        }
        let name = self.word();
        if name.is_empty() {
            Err(self.error("expected attribute name"))
        } else {
            Ok(name)
        }
    }

    fn quoted(&mut self, delimiter: char) -> Result<String, ClientError> {
        self.expect(delimiter)?;
        let mut out = String::new();
        loop {
            match self.chars.next() {
                Some((_, '\\')) => match self.chars.next() {
                    Some((_, c)) => out.push(unescape(c)),
                    None => return Err(self.error("dangling escape")),
                },
                Some((_, c)) if c == delimiter => return Ok(out),
                Some((_, c)) => out.push(c),
                None => return Err(self.error("unterminated literal")),
            }
        }
    }
}

fn unescape(c: char) -> char {
    match c {
        '0' => '\0',
        'b' => '\x08',
        't' => '\t',
        'z' => '\x1a',
        'n' => '\n',
        'r' => '\r',
        other => other,
    }
}
