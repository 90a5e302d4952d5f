use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical mutation kind. Outbox entries and cache snapshots are keyed by one
/// of these, so a queued edit for one form never leaks into another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormKind {
    SchoolProfile,
    SchoolHead,
    Enrolment,
    OrganizedClasses,
    LearnerStatistics,
    TeachingPersonnel,
    TeacherSpecialization,
    SchoolResources,
    ShiftingModalities,
    FacilityRepair,
    SiteInspection,
    DamageAssessment,
}

impl FormKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormKind::SchoolProfile => "SCHOOL_PROFILE",
            FormKind::SchoolHead => "SCHOOL_HEAD",
            FormKind::Enrolment => "ENROLMENT",
            FormKind::OrganizedClasses => "ORGANIZED_CLASSES",
            FormKind::LearnerStatistics => "LEARNER_STATISTICS",
            FormKind::TeachingPersonnel => "TEACHING_PERSONNEL",
            FormKind::TeacherSpecialization => "TEACHER_SPECIALIZATION",
            FormKind::SchoolResources => "SCHOOL_RESOURCES",
            FormKind::ShiftingModalities => "SHIFTING_MODALITIES",
            FormKind::FacilityRepair => "FACILITY_REPAIR",
            FormKind::SiteInspection => "SITE_INSPECTION",
            FormKind::DamageAssessment => "DAMAGE_ASSESSMENT",
        }
    }

    pub fn parse(value: &str) -> Option<FormKind> {
        match value {
            "SCHOOL_PROFILE" => Some(FormKind::SchoolProfile),
            "SCHOOL_HEAD" => Some(FormKind::SchoolHead),
            "ENROLMENT" => Some(FormKind::Enrolment),
            "ORGANIZED_CLASSES" => Some(FormKind::OrganizedClasses),
            "LEARNER_STATISTICS" => Some(FormKind::LearnerStatistics),
            "TEACHING_PERSONNEL" => Some(FormKind::TeachingPersonnel),
            "TEACHER_SPECIALIZATION" => Some(FormKind::TeacherSpecialization),
            "SCHOOL_RESOURCES" => Some(FormKind::SchoolResources),
            "SHIFTING_MODALITIES" => Some(FormKind::ShiftingModalities),
            "FACILITY_REPAIR" => Some(FormKind::FacilityRepair),
            "SITE_INSPECTION" => Some(FormKind::SiteInspection),
            "DAMAGE_ASSESSMENT" => Some(FormKind::DamageAssessment),
            _ => None,
        }
    }

    /// Human-readable description shown in the queue UI.
    pub fn label(&self) -> &'static str {
        match self {
            FormKind::SchoolProfile => "School Profile",
            FormKind::SchoolHead => "School Head Information",
            FormKind::Enrolment => "Enrolment",
            FormKind::OrganizedClasses => "Organized Classes",
            FormKind::LearnerStatistics => "Learner Statistics",
            FormKind::TeachingPersonnel => "Teaching Personnel",
            FormKind::TeacherSpecialization => "Teacher Specialization",
            FormKind::SchoolResources => "School Resources",
            FormKind::ShiftingModalities => "Shifting Modalities",
            FormKind::FacilityRepair => "Facility Repair",
            FormKind::SiteInspection => "Site Inspection",
            FormKind::DamageAssessment => "Damage Assessment",
        }
    }

    /// Relative path a mutation of this kind is submitted to.
    pub fn save_path(&self) -> &'static str {
        match self {
            FormKind::SchoolProfile => "/api/save-school",
            FormKind::SchoolHead => "/api/save-school-head",
            FormKind::Enrolment => "/api/save-enrolment",
            FormKind::OrganizedClasses => "/api/save-organized-classes",
            FormKind::LearnerStatistics => "/api/save-learner-statistics",
            FormKind::TeachingPersonnel => "/api/save-teaching-personnel",
            FormKind::TeacherSpecialization => "/api/save-teacher-specialization",
            FormKind::SchoolResources => "/api/save-school-resources",
            FormKind::ShiftingModalities => "/api/save-shifting-modalities",
            FormKind::FacilityRepair => "/api/save-repair",
            FormKind::SiteInspection => "/api/save-site-inspection",
            FormKind::DamageAssessment => "/api/save-damage-assessment",
        }
    }

    /// Relative path the authoritative state for a user is fetched from.
    pub fn fetch_path(&self, user_id: &str) -> String {
        match self {
            FormKind::SchoolProfile => format!("/api/school-by-user/{user_id}"),
            FormKind::SchoolHead => format!("/api/school-head/{user_id}"),
            other => format!("/api/{}/{user_id}", other.slug()),
        }
    }

    fn slug(&self) -> &'static str {
        match self {
            FormKind::SchoolProfile => "school-profile",
            FormKind::SchoolHead => "school-head",
            FormKind::Enrolment => "enrolment",
            FormKind::OrganizedClasses => "organized-classes",
            FormKind::LearnerStatistics => "learner-statistics",
            FormKind::TeachingPersonnel => "teaching-personnel",
            FormKind::TeacherSpecialization => "teacher-specialization",
            FormKind::SchoolResources => "school-resources",
            FormKind::ShiftingModalities => "shifting-modalities",
            FormKind::FacilityRepair => "facility-repairs",
            FormKind::SiteInspection => "site-inspections",
            FormKind::DamageAssessment => "damage-assessments",
        }
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_roundtrips_every_kind() {
        let kinds = [
            FormKind::SchoolProfile,
            FormKind::SchoolHead,
            FormKind::Enrolment,
            FormKind::OrganizedClasses,
            FormKind::LearnerStatistics,
            FormKind::TeachingPersonnel,
            FormKind::TeacherSpecialization,
            FormKind::SchoolResources,
            FormKind::ShiftingModalities,
            FormKind::FacilityRepair,
            FormKind::SiteInspection,
            FormKind::DamageAssessment,
        ];
        for kind in kinds {
            assert_eq!(FormKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(FormKind::parse("NOT_A_FORM"), None);
    }

    #[test]
    fn serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&FormKind::OrganizedClasses).unwrap();
        assert_eq!(json, "\"ORGANIZED_CLASSES\"");
        let kind: FormKind = serde_json::from_str("\"LEARNER_STATISTICS\"").unwrap();
        assert_eq!(kind, FormKind::LearnerStatistics);
    }
}
