use std::cmp::Ordering;
use tps_core::models::Applicant;

/// Compare two applicants by allocation priority.
///
/// Higher placement points come first; equal points fall back to the national
/// ID in ascending order. The result is a strict total order over distinct
/// teachers, so sorting with it never depends on input order.
pub fn priority_order(a: &Applicant, b: &Applicant) -> Ordering {
    b.placement_points
        .cmp(&a.placement_points)
        .then_with(|| a.teacher_id.cmp(&b.teacher_id))
}
