//! Column descriptors

use std::fmt;
use std::rc::Rc;

use super::record::{Record, Value};

/// Custom cell renderer: `(value, row, column key) -> displayed value`.
///
/// The value is `Value::Null` when the row has no field for the column.
pub type Renderer<H> = Rc<dyn Fn(&Value<H>, &Record<H>, &str) -> Value<H>>;

/// Declarative description of one grid column
pub struct Column<H = ()> {
    /// Field the column reads from each record
    pub key: String,
    /// Header label
    pub header: String,
    /// Preferred width in terminal cells
    pub width: Option<u16>,
    pub render: Option<Renderer<H>>,
}

impl<H> Column<H> {
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            width: None,
            render: None,
        }
    }

    /// Column whose header is its key
    pub fn from_key(key: impl Into<String>) -> Self {
        let key = key.into();
        Self::new(key.clone(), key)
    }

    pub fn width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    pub fn render<F>(mut self, render: F) -> Self
    where
        F: Fn(&Value<H>, &Record<H>, &str) -> Value<H> + 'static,
    {
        self.render = Some(Rc::new(render));
        self
    }

    pub fn has_renderer(&self) -> bool {
        self.render.is_some()
    }
}

impl<H> Clone for Column<H> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            header: self.header.clone(),
            width: self.width,
            render: self.render.clone(),
        }
    }
}

impl<H> fmt::Debug for Column<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("width", &self.width)
            .field("render", &self.render.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
