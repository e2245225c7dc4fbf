//! Staffing feasibility: match booked callsigns against the event's
//! minimum-staffing patterns, and validate individual station assignments
//! against computed qualifications.

mod checker;
mod requirement;

pub use checker::{
    check_staffing, validate_assignment, AssignmentVerdict, PatternCoverage, StaffingReport,
    StationSlot,
};
pub use requirement::{RequirementMap, StaffingError};
