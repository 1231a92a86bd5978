//! Grouping of resolved spans into page rectangles.

use serde::{Deserialize, Serialize};

use crate::document::{position, BoundingBox, PositionedCharacter};
use crate::normalize::AnchorMap;
use crate::reconcile::OriginalSpan;

/// Highlight geometry for one span on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRegion {
    pub page_index: usize,
    /// One rectangle per run of adjacent characters on a line.
    pub boxes: Vec<BoundingBox>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Rectangle being grown over adjacent characters.
struct Run {
    rect: BoundingBox,
    last_box: BoundingBox,
}

/// Turns [`OriginalSpan`]s into [`AnnotationRegion`]s.
///
/// Characters merge into one rectangle while they are neighbors in the
/// stream (only dropped characters between them) and on the same line.
/// Page changes start a new region carrying the same message.
pub struct AnnotationGrouper<'a> {
    anchors: &'a AnchorMap,
    chars: &'a [PositionedCharacter],
}

impl<'a> AnnotationGrouper<'a> {
    /// `chars` must be the stream the anchors were built from.
    #[must_use]
    pub fn new(anchors: &'a AnchorMap, chars: &'a [PositionedCharacter]) -> Self {
        Self { anchors, chars }
    }

    #[must_use]
    pub fn group(&self, span: &OriginalSpan<'_>) -> Vec<AnnotationRegion> {
        let message = span.span.message();
        let new_region = |page_index| AnnotationRegion {
            page_index,
            boxes: Vec::new(),
            message: message.clone(),
            help: span.span.help.clone(),
            category: span.span.category.clone(),
        };

        let mut regions: Vec<AnnotationRegion> = Vec::new();
        let mut current: Option<AnnotationRegion> = None;
        let mut run: Option<Run> = None;
        let mut previous: Option<usize> = None;

        for c in &span.characters {
            let page_changed = current
                .as_ref()
                .is_some_and(|r| r.page_index != c.page_index);
            if page_changed {
                close_run(&mut current, &mut run);
                regions.extend(current.take().filter(|r| !r.boxes.is_empty()));
            }
            let region = current.get_or_insert_with(|| new_region(c.page_index));

            let adjacent = !page_changed && previous.is_some_and(|p| self.adjacent(p, c.original_index));
            previous = Some(c.original_index);

            if !has_geometry(c) {
                continue;
            }
            let extends = run
                .as_ref()
                .is_some_and(|r| adjacent && r.last_box.same_line(&c.bbox));
            if extends {
                if let Some(r) = run.as_mut() {
                    r.rect = r.rect.union(&c.bbox);
                    r.last_box = c.bbox;
                }
            } else if let Some(done) = run.replace(Run {
                rect: c.bbox,
                last_box: c.bbox,
            }) {
                region.boxes.push(done.rect);
            }
        }
        close_run(&mut current, &mut run);
        regions.extend(current.filter(|r| !r.boxes.is_empty()));
        regions
    }

    /// Group every span, in span order.
    #[must_use]
    pub fn group_all(&self, spans: &[OriginalSpan<'_>]) -> Vec<AnnotationRegion> {
        spans.iter().flat_map(|s| self.group(s)).collect()
    }

    /// Only dropped characters lie between `a` and `b` in the stream.
    /// Indices need not be consecutive.
    fn adjacent(&self, a: usize, b: usize) -> bool {
        let (Some(pa), Some(pb)) = (position(self.chars, a), position(self.chars, b)) else {
            return false;
        };
        pb > pa
            && self.chars[pa + 1..pb]
                .iter()
                .all(|c| self.anchors.is_dropped(c.original_index))
    }
}

fn has_geometry(c: &PositionedCharacter) -> bool {
    !c.is_line_break() && !c.bbox.is_empty()
}

fn close_run(region: &mut Option<AnnotationRegion>, run: &mut Option<Run>) {
    if let (Some(region), Some(done)) = (region.as_mut(), run.take()) {
        region.boxes.push(done.rect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::ErrorSpan;
    use crate::document::from_plain_text;
    use crate::normalize::{Normalized, Normalizer};
    use crate::reconcile::Reconciler;

    fn setup(chars: &[PositionedCharacter]) -> Normalized {
        Normalizer::default().normalize(chars).unwrap()
    }

    #[test]
    fn single_word_becomes_one_box() {
        let chars = from_plain_text("되요 오늘 날씨 좋다");
        let normalized = setup(&chars);
        let original = Reconciler::new(&normalized, &chars)
            .reconcile(&ErrorSpan::new(0, 2, "되요", "돼요"))
            .unwrap();

        let regions = AnnotationGrouper::new(normalized.anchors(), &chars).group(&original);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].page_index, 0);
        assert_eq!(regions[0].message, "되요 → 돼요");
        assert_eq!(regions[0].boxes, vec![chars[0].bbox.union(&chars[1].bbox)]);
    }

    #[test]
    fn hyphenated_word_splits_per_line() {
        let chars = from_plain_text("안녕하세-\n요");
        let normalized = setup(&chars);
        let original = Reconciler::new(&normalized, &chars)
            .reconcile(&ErrorSpan::new(0, 5, "안녕하세요", "안녕하셔요"))
            .unwrap();

        let regions = AnnotationGrouper::new(normalized.anchors(), &chars).group(&original);
        assert_eq!(regions.len(), 1);
        let boxes = &regions[0].boxes;
        assert_eq!(boxes.len(), 2);
        // First line includes the hyphen.
        assert_eq!(boxes[0], chars[0].bbox.union(&chars[4].bbox));
        assert_eq!(boxes[1], chars[6].bbox);
    }

    #[test]
    fn non_adjacent_characters_get_separate_boxes() {
        let chars = from_plain_text("가 나");
        let normalized = setup(&chars);
        let original = Reconciler::new(&normalized, &chars)
            .reconcile(&ErrorSpan::new(0, 3, "가 나", ""))
            .unwrap();
        let regions = AnnotationGrouper::new(normalized.anchors(), &chars).group(&original);
        // The space is kept, so all three are adjacent.
        assert_eq!(regions[0].boxes.len(), 1);

        let partial = OriginalSpan {
            characters: vec![&chars[0], &chars[2]],
            ..original
        };
        let regions = AnnotationGrouper::new(normalized.anchors(), &chars).group(&partial);
        assert_eq!(regions[0].boxes, vec![chars[0].bbox, chars[2].bbox]);
    }

    #[test]
    fn page_crossing_span_yields_region_per_page() {
        let bbox = |x: f32| BoundingBox::new(x, 0.0, 10.0, 12.0);
        let chars = vec![
            PositionedCharacter::new(0, 0, '다', bbox(0.0)),
            PositionedCharacter::new(0, 1, '음', bbox(10.0)),
            PositionedCharacter::new(1, 2, '장', bbox(0.0)),
        ];
        let normalized = setup(&chars);
        let mut span = ErrorSpan::new(0, 3, "다음장", "다음 장");
        span.help = Some("띄어쓰기".into());
        let original = Reconciler::new(&normalized, &chars).reconcile(&span).unwrap();

        let regions = AnnotationGrouper::new(normalized.anchors(), &chars).group(&original);
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].page_index, 0);
        assert_eq!(regions[0].boxes, vec![bbox(0.0).union(&bbox(10.0))]);
        assert_eq!(regions[1].page_index, 1);
        assert_eq!(regions[1].boxes, vec![bbox(0.0)]);
        assert_eq!(regions[0].message, regions[1].message);
        assert_eq!(regions[1].help.as_deref(), Some("띄어쓰기"));
    }

    #[test]
    fn sparse_indices_still_merge_into_one_box() {
        let bbox = |x: f32| BoundingBox::new(x, 0.0, 10.0, 12.0);
        let chars = vec![
            PositionedCharacter::new(0, 10, '되', bbox(0.0)),
            PositionedCharacter::new(0, 20, '요', bbox(10.0)),
            PositionedCharacter::new(0, 30, ' ', bbox(20.0)),
            PositionedCharacter::new(0, 40, '좋', bbox(30.0)),
        ];
        let normalized = setup(&chars);
        let original = Reconciler::new(&normalized, &chars)
            .reconcile(&ErrorSpan::new(0, 2, "되요", "돼요"))
            .unwrap();
        assert_eq!(original.original_indices(), vec![10, 20]);

        let regions = AnnotationGrouper::new(normalized.anchors(), &chars).group(&original);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].boxes, vec![bbox(0.0).union(&bbox(10.0))]);
    }

    #[test]
    fn sparse_merged_word_spans_dropped_hyphen() {
        let bbox = |x: f32, y: f32| BoundingBox::new(x, y, 10.0, 12.0);
        let chars = vec![
            PositionedCharacter::new(0, 100, '가', bbox(0.0, 0.0)),
            PositionedCharacter::new(0, 102, '-', bbox(10.0, 0.0)),
            PositionedCharacter::new(0, 104, '\n', BoundingBox::default()),
            PositionedCharacter::new(0, 106, '나', bbox(20.0, 0.0)),
        ];
        let normalized = setup(&chars);
        assert_eq!(normalized.text(), "가나");
        let original = Reconciler::new(&normalized, &chars)
            .reconcile(&ErrorSpan::new(0, 2, "가나", ""))
            .unwrap();

        // Hyphen joins the run, the break has no box, all on one line.
        let regions = AnnotationGrouper::new(normalized.anchors(), &chars).group(&original);
        assert_eq!(regions[0].boxes, vec![bbox(0.0, 0.0).union(&bbox(20.0, 0.0))]);
    }

    #[test]
    fn line_breaks_only_yield_no_region() {
        let chars = vec![PositionedCharacter::new(0, 0, '\n', BoundingBox::default())];
        let normalized = setup(&chars);
        let original = Reconciler::new(&normalized, &chars)
            .reconcile(&ErrorSpan::new(0, 1, "", ""))
            .unwrap();
        assert!(AnnotationGrouper::new(normalized.anchors(), &chars)
            .group(&original)
            .is_empty());
    }
}
