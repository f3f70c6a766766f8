//! Output types: menu items, per-unit timings and the response envelope.
//!
//! Field names of the serialized envelope (`platillos`, `metricas`, …) are
//! part of the public HTTP contract and must not change.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// One extracted dish, kept exactly as the model emitted it.
///
/// The model is asked for `{name, description, price, quantity}` strings,
/// but its output is trusted verbatim: no field is validated or coerced.
/// Accessors return `None` when a field is missing or not a string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MenuItem(pub Value);

impl MenuItem {
    fn field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.field("name")
    }

    pub fn description(&self) -> Option<&str> {
        self.field("description")
    }

    pub fn price(&self) -> Option<&str> {
        self.field("price")
    }

    pub fn quantity(&self) -> Option<&str> {
        self.field("quantity")
    }
}

/// Elapsed seconds per unit, labelled `p1`, `p2`, … in processing order.
///
/// Serialized as a JSON object whose key order is the insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageTimings {
    entries: Vec<(String, f64)>,
}

impl PageTimings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the time for the 1-based unit `unit_num`, rounded to 2 decimals.
    pub fn record(&mut self, unit_num: usize, secs: f64) {
        self.entries.push((format!("p{unit_num}"), round2(secs)));
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, s)| *s)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mean of the recorded times, rounded to 2 decimals. 0.0 when empty.
    pub fn average(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.entries.iter().map(|(_, s)| s).sum();
        round2(sum / self.entries.len() as f64)
    }
}

impl Serialize for PageTimings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, secs) in &self.entries {
            map.serialize_entry(label, secs)?;
        }
        map.end()
    }
}

/// Timing and count metrics for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub total_platillos: usize,
    pub tiempo_total: f64,
    pub tiempos_por_pagina: PageTimings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_paginas: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiempo_promedio_pagina: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiempo_conversion_pdf: Option<f64>,
}

/// Items plus metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionData {
    pub platillos: Vec<MenuItem>,
    pub metricas: Metrics,
}

/// The success envelope returned by `POST /procesar-menu`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingResult {
    pub status: &'static str,
    pub data: ExtractionData,
}

impl ProcessingResult {
    pub fn success(data: ExtractionData) -> Self {
        Self {
            status: "success",
            data,
        }
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.data.platillos
    }

    pub fn metrics(&self) -> &Metrics {
        &self.data.metricas
    }
}

/// Round to two decimal places.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn timings_serialize_in_insertion_order() {
        let mut t = PageTimings::new();
        for n in [1, 2, 10, 3] {
            t.record(n, 0.5);
        }
        let s = serde_json::to_string(&t).unwrap();
        assert_eq!(s, r#"{"p1":0.5,"p2":0.5,"p10":0.5,"p3":0.5}"#);
    }

    #[test]
    fn timings_are_rounded() {
        let mut t = PageTimings::new();
        t.record(1, 1.23456);
        t.record(2, 1.77);
        assert_eq!(t.get("p1"), Some(1.23));
        assert_eq!(t.average(), 1.5);
        assert_eq!(PageTimings::new().average(), 0.0);
    }

    #[test]
    fn non_pdf_metrics_omit_page_fields() {
        let mut t = PageTimings::new();
        t.record(1, 0.4);
        let result = ProcessingResult::success(ExtractionData {
            platillos: vec![],
            metricas: Metrics {
                total_platillos: 0,
                tiempo_total: 0.4,
                tiempos_por_pagina: t,
                total_paginas: None,
                tiempo_promedio_pagina: None,
                tiempo_conversion_pdf: None,
            },
        });
        let v = serde_json::to_value(&result).unwrap();
        assert_eq!(
            v,
            json!({
                "status": "success",
                "data": {
                    "platillos": [],
                    "metricas": {
                        "total_platillos": 0,
                        "tiempo_total": 0.4,
                        "tiempos_por_pagina": {"p1": 0.4}
                    }
                }
            })
        );
    }

    #[test]
    fn menu_item_accessors() {
        let item = MenuItem(json!({"name": "Taco", "price": 2.5}));
        assert_eq!(item.name(), Some("Taco"));
        assert_eq!(item.price(), None);
        assert_eq!(item.description(), None);
    }
}
