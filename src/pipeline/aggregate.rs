//! Aggregation: run every unit through the model, in order, and collect.
//!
//! Units are processed strictly sequentially. Each unit's outcome is an
//! explicit `Result`; failures (a unit that could not be prepared, or a
//! failed model call) are logged and contribute nothing, but the unit is
//! still timed and still gets its `p<N>` entry.

use crate::output::{MenuItem, PageTimings};
use crate::pipeline::llm::ContentModel;
use crate::pipeline::sanitize::parse_menu_items;
use crate::pipeline::units::PreparedUnit;
use std::time::Instant;
use tracing::{info, warn};

/// Items and timings gathered over all units of one document.
#[derive(Debug, Clone, Default)]
pub struct Aggregate {
    pub items: Vec<MenuItem>,
    pub timings: PageTimings,
    /// 1-based numbers of units whose model call failed.
    pub failed_units: Vec<usize>,
}

/// Invoke `model` on each unit and concatenate the sanitized items.
pub async fn process_units(model: &dyn ContentModel, units: &[PreparedUnit]) -> Aggregate {
    let mut aggregate = Aggregate::default();
    let total = units.len();

    for (idx, unit) in units.iter().enumerate() {
        let unit_num = idx + 1;
        let start = Instant::now();

        let outcome = match unit {
            Ok(unit) => model.generate(unit_num, unit).await,
            Err(e) => Err(e.clone()),
        };

        match outcome {
            Ok(reply) => {
                let items = parse_menu_items(&reply);
                info!("Unit {}/{}: {} items", unit_num, total, items.len());
                aggregate.items.extend(items);
            }
            Err(e) => {
                warn!("Unit {}/{} contributed no items: {}", unit_num, total, e);
                aggregate.failed_units.push(unit_num);
            }
        }

        let elapsed = start.elapsed().as_secs_f64();
        aggregate.timings.record(unit_num, elapsed);
        info!("Unit {}/{} processed in {:.2}s", unit_num, total, elapsed);
    }

    aggregate
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::InvocationError;
    use crate::pipeline::units::ContentUnit;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays canned replies in order; `Err(())` entries simulate failures.
    pub(crate) struct ScriptedModel {
        replies: Mutex<Vec<Result<String, ()>>>,
        pub calls: AtomicUsize,
    }

    impl ScriptedModel {
        pub(crate) fn new(replies: Vec<Result<&str, ()>>) -> Self {
            Self {
                replies: Mutex::new(
                    replies
                        .into_iter()
                        .rev()
                        .map(|r| r.map(str::to_string))
                        .collect(),
                ),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ContentModel for ScriptedModel {
        async fn generate(&self, unit_num: usize, _unit: &ContentUnit) -> Result<String, InvocationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.replies.lock().unwrap().pop();
            match next {
                Some(Ok(reply)) => Ok(reply),
                _ => Err(InvocationError::ModelFailed {
                    unit: unit_num,
                    detail: "scripted failure".into(),
                }),
            }
        }
    }

    fn text_units(n: usize) -> Vec<PreparedUnit> {
        (1..=n).map(|i| Ok(ContentUnit::Text(format!("page {i}")))).collect()
    }

    const SOUP: &str = r#"[{"name":"Soup","description":"","price":"5","quantity":"1"}]"#;

    #[tokio::test]
    async fn two_pages_first_empty() {
        let model = ScriptedModel::new(vec![Ok("[]"), Ok(SOUP)]);
        let agg = process_units(&model, &text_units(2)).await;

        assert_eq!(agg.items.len(), 1);
        assert_eq!(agg.items[0].name(), Some("Soup"));
        assert_eq!(agg.timings.labels().collect::<Vec<_>>(), vec!["p1", "p2"]);
        assert!(agg.failed_units.is_empty());
    }

    #[tokio::test]
    async fn failing_page_does_not_block_later_pages() {
        let model = ScriptedModel::new(vec![
            Ok(r#"[{"name":"A"}]"#),
            Err(()),
            Ok(r#"```json
[{"name":"C1"},{"name":"C2"}]
```"#),
        ]);
        let agg = process_units(&model, &text_units(3)).await;

        let names: Vec<_> = agg.items.iter().filter_map(|i| i.name()).collect();
        assert_eq!(names, vec!["A", "C1", "C2"]);
        assert_eq!(agg.timings.len(), 3);
        assert!(agg.timings.get("p2").is_some());
        assert_eq!(agg.failed_units, vec![2]);
        assert_eq!(model.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn unprepared_unit_is_skipped_without_a_model_call() {
        let model = ScriptedModel::new(vec![Ok(r#"[{"name":"A"}]"#), Ok(r#"[{"name":"C"}]"#)]);
        let mut units = text_units(3);
        units[1] = Err(InvocationError::PageUnreadable {
            unit: 2,
            detail: "encoder refused the page".into(),
        });

        let agg = process_units(&model, &units).await;

        let names: Vec<_> = agg.items.iter().filter_map(|i| i.name()).collect();
        assert_eq!(names, vec!["A", "C"]);
        assert_eq!(agg.failed_units, vec![2]);
        assert_eq!(agg.timings.labels().collect::<Vec<_>>(), vec!["p1", "p2", "p3"]);
        assert_eq!(model.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn duplicates_across_units_are_kept() {
        let model = ScriptedModel::new(vec![Ok(SOUP), Ok(SOUP)]);
        let agg = process_units(&model, &text_units(2)).await;
        assert_eq!(agg.items.len(), 2);
        assert_eq!(agg.items[0], agg.items[1]);
    }

    #[tokio::test]
    async fn unparseable_reply_contributes_nothing_but_is_not_a_failure() {
        let model = ScriptedModel::new(vec![Ok("Sorry, this is not a menu.")]);
        let agg = process_units(&model, &text_units(1)).await;
        assert!(agg.items.is_empty());
        assert!(agg.failed_units.is_empty());
        assert_eq!(agg.timings.len(), 1);
    }

    #[tokio::test]
    async fn no_units_no_calls() {
        let model = ScriptedModel::new(vec![]);
        let agg = process_units(&model, &[]).await;
        assert!(agg.items.is_empty());
        assert!(agg.timings.is_empty());
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }
}
