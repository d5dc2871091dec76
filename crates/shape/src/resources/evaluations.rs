//! Bid evaluations: one company office judged against one announcement,
//! with the per-requirement results underneath.

use bidboard_core::{FlatRow, Scalar};
use serde::Serialize;

use crate::fallback::{Fallback, FallbackPolicy};
use crate::fields::{pad_sequence, EvaluationStatus, IdPrefix};
use crate::group::{push_unique_by, Grouped, Grouper};
use crate::resource::Resource;
use crate::template::QueryTemplate;

use super::announcements::Department;
use super::companies::Branch;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    /// Raw evaluation number as text.
    pub id: Option<String>,
    /// Same number, zero-padded to eight digits.
    pub evaluation_no: Option<String>,
    pub announcement: EvaluatedAnnouncement,
    pub company: CompanySummary,
    pub branch: Branch,
    pub requirements: Vec<RequirementResult>,
    pub status: EvaluationStatus,
    pub work_status: Scalar,
    pub current_step: Scalar,
    pub evaluated_at: Scalar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluatedAnnouncement {
    pub id: Option<String>,
    pub orderer_id: Option<String>,
    pub title: Scalar,
    pub category: Scalar,
    pub organization: Scalar,
    pub work_location: Scalar,
    pub department: Department,
    pub publish_date: Scalar,
    pub explanation_start_date: Scalar,
    pub explanation_end_date: Scalar,
    pub application_start_date: Scalar,
    pub application_end_date: Scalar,
    pub bid_start_date: Scalar,
    pub bid_end_date: Scalar,
    pub deadline: Scalar,
    pub estimated_amount_min: Scalar,
    pub estimated_amount_max: Scalar,
    pub pdf_url: Scalar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanySummary {
    pub id: Option<String>,
    pub name: Scalar,
    pub address: Scalar,
    pub grade: Scalar,
    pub priority: Scalar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementResult {
    pub id: Option<String>,
    pub category: Scalar,
    pub name: Scalar,
    pub is_met: Scalar,
    pub reason: Scalar,
    pub evidence: Scalar,
}

pub struct Evaluations;

impl Resource for Evaluations {
    type Entity = Evaluation;

    const NAME: &'static str = "evaluations";

    const COLUMNS: &'static [&'static str] = &[
        "evaluation_no",
        "announcement_no",
        "orderer_no",
        "announcement_title",
        "announcement_category",
        "announcement_organization",
        "announcement_work_location",
        "department_postalcode",
        "department_address",
        "department_name",
        "department_contact_person",
        "department_phone",
        "department_fax",
        "department_email",
        "announcement_publish_date",
        "announcement_explanation_start_date",
        "announcement_explanation_end_date",
        "announcement_application_start_date",
        "announcement_application_end_date",
        "announcement_bid_start_date",
        "announcement_bid_end_date",
        "announcement_deadline",
        "announcement_estimated_amount_min",
        "announcement_estimated_amount_max",
        "announcement_pdf_url",
        "company_no",
        "company_name",
        "company_address",
        "company_grade",
        "company_priority",
        "office_no",
        "office_name",
        "office_address",
        "requirement_no",
        "requirement_type",
        "requirement_text",
        "requirement_is_met",
        "requirement_description",
        "requirement_evidence",
        "final_status",
        "work_status",
        "current_step",
        "evaluated_at",
    ];

    const TEMPLATE: QueryTemplate = QueryTemplate::new(
        r#"WITH picked AS (
    SELECT evaluation_no
    FROM {prefix}company_bid_judgement
    ORDER BY evaluation_no
    LIMIT {limit}
),
requirement_results AS (
    SELECT announcement_no, office_no, requirement_no, requirement_type,
           requirement_description, evidence, true AS is_met
    FROM {prefix}sufficient_requirements
    UNION ALL
    SELECT announcement_no, office_no, requirement_no, requirement_type,
           requirement_description, evidence, false AS is_met
    FROM {prefix}insufficient_requirements
)
SELECT
    eval.evaluation_no,
    eval.announcement_no,
    anno.orderer_no,
    anno.work_name              AS announcement_title,
    anno.category               AS announcement_category,
    anno.top_agency_name        AS announcement_organization,
    anno.work_place             AS announcement_work_location,
    anno.zipcode                AS department_postalcode,
    anno.address                AS department_address,
    anno.department             AS department_name,
    anno.assignee_name          AS department_contact_person,
    anno.telephone              AS department_phone,
    anno.fax                    AS department_fax,
    anno.mail                   AS department_email,
    anno.publish_date           AS announcement_publish_date,
    anno.doc_dist_start         AS announcement_explanation_start_date,
    anno.doc_dist_end           AS announcement_explanation_end_date,
    anno.submission_start       AS announcement_application_start_date,
    anno.submission_end         AS announcement_application_end_date,
    anno.bid_start_date         AS announcement_bid_start_date,
    anno.bid_end_date           AS announcement_bid_end_date,
    anno.bid_end_date           AS announcement_deadline,
    anno.estimated_amount_min   AS announcement_estimated_amount_min,
    anno.estimated_amount_max   AS announcement_estimated_amount_max,
    anno.pdf_url                AS announcement_pdf_url,
    eval.company_no,
    comp.company_name,
    comp.company_address,
    comp.grade                  AS company_grade,
    comp.priority               AS company_priority,
    eval.office_no,
    office.office_name,
    office.office_address,
    req.requirement_no,
    req.requirement_type,
    breq.requirement_text,
    req.is_met                  AS requirement_is_met,
    req.requirement_description,
    req.evidence                AS requirement_evidence,
    eval.final_status,
    eval.work_status,
    eval.current_step,
    eval.updated_date           AS evaluated_at
FROM picked
JOIN {prefix}company_bid_judgement eval ON eval.evaluation_no = picked.evaluation_no
LEFT JOIN {prefix}bid_announcements anno ON anno.announcement_no = eval.announcement_no
LEFT JOIN {prefix}company_master comp ON comp.company_no = eval.company_no
LEFT JOIN {prefix}office_master office ON office.office_no = eval.office_no
LEFT JOIN requirement_results req
    ON req.announcement_no = eval.announcement_no AND req.office_no = eval.office_no
LEFT JOIN {prefix}bid_requirements breq
    ON breq.announcement_no = req.announcement_no AND breq.requirement_no = req.requirement_no
ORDER BY eval.evaluation_no, req.requirement_no"#,
    );

    const FALLBACKS: FallbackPolicy = FallbackPolicy::new(&[
        ("announcement_publish_date", Fallback::Date),
        ("announcement_explanation_start_date", Fallback::Date),
        ("announcement_explanation_end_date", Fallback::Date),
        ("announcement_application_start_date", Fallback::Date),
        ("announcement_application_end_date", Fallback::Date),
        ("announcement_bid_start_date", Fallback::Date),
        ("announcement_bid_end_date", Fallback::Date),
        ("announcement_deadline", Fallback::Date),
        ("evaluated_at", Fallback::Date),
        ("requirement_is_met", Fallback::False),
        ("final_status", Fallback::False),
    ]);

    fn group(rows: &[FlatRow]) -> Grouped<Evaluation> {
        Grouper::new(|row: &FlatRow| row.text("evaluation_no"), head)
            .child(|eval: &mut Evaluation, row: &FlatRow| {
                if let Some(req) = requirement(row) {
                    push_unique_by(&mut eval.requirements, req, |r| r.id.clone());
                }
            })
            .run(rows)
    }
}

fn head(row: &FlatRow) -> Evaluation {
    Evaluation {
        id: row.text("evaluation_no"),
        evaluation_no: pad_sequence(row.get("evaluation_no")),
        announcement: EvaluatedAnnouncement {
            id: IdPrefix::Announcement.apply(row.get("announcement_no")),
            orderer_id: IdPrefix::Orderer.apply(row.get("orderer_no")),
            title: row.value("announcement_title"),
            category: row.value("announcement_category"),
            organization: row.value("announcement_organization"),
            work_location: row.value("announcement_work_location"),
            department: Department::from_row(row),
            publish_date: row.value("announcement_publish_date"),
            explanation_start_date: row.value("announcement_explanation_start_date"),
            explanation_end_date: row.value("announcement_explanation_end_date"),
            application_start_date: row.value("announcement_application_start_date"),
            application_end_date: row.value("announcement_application_end_date"),
            bid_start_date: row.value("announcement_bid_start_date"),
            bid_end_date: row.value("announcement_bid_end_date"),
            deadline: row.value("announcement_deadline"),
            estimated_amount_min: row.value("announcement_estimated_amount_min"),
            estimated_amount_max: row.value("announcement_estimated_amount_max"),
            pdf_url: row.value("announcement_pdf_url"),
        },
        company: CompanySummary {
            id: IdPrefix::Company.apply(row.get("company_no")),
            name: row.value("company_name"),
            address: row.value("company_address"),
            grade: row.value("company_grade"),
            priority: row.value("company_priority"),
        },
        branch: Branch::from_row(row).unwrap_or(Branch {
            id: None,
            name: Scalar::Null,
            address: Scalar::Null,
        }),
        requirements: Vec::new(),
        status: EvaluationStatus::from_final_status(row.get("final_status")),
        work_status: row.value("work_status"),
        current_step: row.value("current_step"),
        evaluated_at: row.value("evaluated_at"),
    }
}

fn requirement(row: &FlatRow) -> Option<RequirementResult> {
    let id = IdPrefix::Requirement.apply(row.get("requirement_no"))?;
    Some(RequirementResult {
        id: Some(id),
        category: row.value("requirement_type"),
        name: row.value("requirement_text"),
        is_met: row.value("requirement_is_met"),
        reason: row.value("requirement_description"),
        evidence: row.value("requirement_evidence"),
    })
}
