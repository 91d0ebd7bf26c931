use serde::Deserialize;
use serde::Serialize;

use crate::output::escape_xml;

// one entry of the hosts dataset; fields the list does not know about are kept in `extra`
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Host {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub location: String,
    #[serde(default, deserialize_with = "lenient::rating")]
    pub rating: f32,
    #[serde(default, deserialize_with = "lenient::whole")]
    pub price: u32,
    #[serde(default, deserialize_with = "lenient::stars")]
    pub stars: u8,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Host {
    pub fn summary(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        let name = self.name.trim();
        parts.push(if name.is_empty() {
            "(unnamed)".to_string()
        } else {
            name.to_string()
        });
        if !self.location.trim().is_empty() {
            parts.push(self.location.trim().to_string());
        }
        if self.stars > 0 {
            parts.push(stars_label(self.stars));
        }
        parts.push(format!("rating {:.1}", self.rating));
        parts.push(format!("${}/night", self.price));
        parts.join(" | ")
    }
}

// Field readers that take whatever the data source sends. Numbers may arrive
// as floats or numeric strings; null or any other mismatch reads as the default.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn number(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|v| v.is_finite())
    }

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            _ => String::new(),
        })
    }

    pub fn rating<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(number(&value).map(|v| v as f32).unwrap_or_default())
    }

    // rounded to the nearest whole unit
    pub fn whole<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(number(&value)
            .map(|v| v.round().clamp(0.0, f64::from(u32::MAX)) as u32)
            .unwrap_or_default())
    }

    pub fn stars<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(number(&value)
            .map(|v| v.round().clamp(0.0, f64::from(u8::MAX)) as u8)
            .unwrap_or_default())
    }
}

fn stars_label(stars: u8) -> String {
    "\u{2605}".repeat(usize::from(stars.min(5)))
}

/// A rendered host: the markup that goes into the hosts container plus the
/// plain text line used on terminals.
#[derive(Clone, Debug, PartialEq)]
pub struct HostElement {
    pub name: String,
    pub markup: String,
    pub text: String,
}

pub trait HostContainer {
    fn append(&mut self, element: HostElement);
}

impl HostContainer for Vec<HostElement> {
    fn append(&mut self, element: HostElement) {
        self.push(element);
    }
}

/// Detached batch of host elements, appended to the page in a single call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fragment {
    elements: Vec<HostElement>,
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn into_elements(self) -> Vec<HostElement> {
        self.elements
    }
}

impl HostContainer for Fragment {
    fn append(&mut self, element: HostElement) {
        self.elements.push(element);
    }
}

// builds the element for `host` and appends it to `container`
pub fn get_host_element<C: HostContainer + ?Sized>(host: &Host, container: &mut C) {
    container.append(build_host_element(host));
}

fn build_host_element(host: &Host) -> HostElement {
    let mut markup = String::new();
    markup.push_str("<article class=\"host\">");
    markup.push_str(&format!(
        "<h3 class=\"host-name\">{}</h3>",
        escape_xml(&host.name)
    ));
    if !host.location.is_empty() {
        markup.push_str(&format!(
            "<span class=\"host-location\">{}</span>",
            escape_xml(&host.location)
        ));
    }
    markup.push_str(&format!(
        "<span class=\"host-stars host-stars-{}\">{}</span>",
        host.stars,
        stars_label(host.stars)
    ));
    markup.push_str(&format!(
        "<span class=\"host-rating\">{:.1}</span>",
        host.rating
    ));
    markup.push_str(&format!(
        "<span class=\"host-price\">{}</span>",
        host.price
    ));
    markup.push_str("</article>");

    HostElement {
        name: host.name.clone(),
        markup,
        text: host.summary(),
    }
}
