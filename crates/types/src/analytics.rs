//! Aggregate analytics returned by `GET analytics/school`.

use serde::{Deserialize, Serialize};

/// Headcounts across the school.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdministrativeSummary {
    pub total_classes: u32,
    pub total_students: u32,
    pub total_teachers: u32,
    pub total_admins: u32,
    pub total_parents: u32,
}

/// Attendance aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceMetrics {
    pub total_recorded_attendance_sessions: u32,
    pub total_present: u32,
    pub total_absent_or_tardy: u32,
    pub school_average_attendance_rate: f64,
}

/// Grading aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingMetrics {
    pub total_assignments_created: u32,
    pub total_submissions_graded: u32,
    pub overall_school_average_grade: f64,
}

/// Attendance and grading rolled up together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub attendance: AttendanceMetrics,
    pub grading: GradingMetrics,
}

/// Per-class student count in the dashboard breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassBreakdown {
    pub class_id: String,
    pub class_name: String,
    pub student_count: u32,
}

/// Full dashboard payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolAnalytics {
    pub school_id: String,
    pub school_name: String,
    pub administrative_summary: AdministrativeSummary,
    pub performance_summary: PerformanceSummary,
    #[serde(default)]
    pub classes: Vec<ClassBreakdown>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn analytics_payload_decodes() {
        let payload = json!({
            "schoolId": "s-1",
            "schoolName": "Acme Academy",
            "administrativeSummary": {
                "totalClasses": 12,
                "totalStudents": 310,
                "totalTeachers": 18,
                "totalAdmins": 2,
                "totalParents": 280
            },
            "performanceSummary": {
                "attendance": {
                    "totalRecordedAttendanceSessions": 140,
                    "totalPresent": 3900,
                    "totalAbsentOrTardy": 210,
                    "schoolAverageAttendanceRate": 0.948
                },
                "grading": {
                    "totalAssignmentsCreated": 96,
                    "totalSubmissionsGraded": 88,
                    "overallSchoolAverageGrade": 71.4
                }
            },
            "classes": [
                {"classId": "c-1", "className": "P1A", "studentCount": 24}
            ]
        });

        let analytics: SchoolAnalytics =
            serde_json::from_value(payload).expect("decode SchoolAnalytics");
        assert_eq!(analytics.administrative_summary.total_students, 310);
        assert_eq!(analytics.classes.len(), 1);
        assert!(analytics.performance_summary.attendance.school_average_attendance_rate > 0.9);
    }
}
