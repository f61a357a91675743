use std::cmp::Ordering;

use crate::detection::domain::face_engine::RawDetection;

/// IoU of two corner-form boxes.
pub fn bbox_iou(a: &RawDetection, b: &RawDetection) -> f64 {
    let x1 = a.x1.max(b.x1);
    let y1 = a.y1.max(b.y1);
    let x2 = a.x2.min(b.x2);
    let y2 = a.y2.min(b.y2);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }
    let area_a = (a.x2 - a.x1) * (a.y2 - a.y1);
    let area_b = (b.x2 - b.x1) * (b.y2 - b.y1);
    inter / (area_a + area_b - inter)
}

/// Greedy NMS: keeps the most confident box of every overlapping group.
///
/// `detections` is sorted by descending confidence and truncated in place.
pub fn nms(detections: &mut Vec<RawDetection>, iou_thresh: f64) {
    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });

    let mut suppressed = vec![false; detections.len()];
    for i in 0..detections.len() {
        if suppressed[i] {
            continue;
        }
        for j in (i + 1)..detections.len() {
            if !suppressed[j] && bbox_iou(&detections[i], &detections[j]) > iou_thresh {
                suppressed[j] = true;
            }
        }
    }

    let mut flags = suppressed.into_iter();
    detections.retain(|_| !flags.next().unwrap_or(true));
}
