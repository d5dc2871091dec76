//! Partner companies.
//!
//! Each child table (categories, past projects, branches, unified and
//! per-orderer qualifications) is stacked with `UNION ALL` and tagged with a
//! `record_kind`, then joined back to the partner master. A partner with
//! `n` categories and `m` branches yields `n + m` rows, not `n * m`. The
//! master columns repeat on every row so any row can build the head.

use bidboard_core::{FlatRow, Scalar};
use serde::Serialize;

use crate::fallback::{Fallback, FallbackPolicy};
use crate::fields::IdPrefix;
use crate::group::{entry_by, Grouped, Grouper};
use crate::resource::Resource;
use crate::template::QueryTemplate;

/// Which child table a detail row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Category,
    PastProject,
    Branch,
    UnifiedQualification,
    OrdererQualification,
}

impl RecordKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            RecordKind::Category => "category",
            RecordKind::PastProject => "past_project",
            RecordKind::Branch => "branch",
            RecordKind::UnifiedQualification => "unified_qualification",
            RecordKind::OrdererQualification => "orderer_qualification",
        }
    }

    fn of(row: &FlatRow) -> Option<Self> {
        match row.get("record_kind").as_str()? {
            "category" => Some(RecordKind::Category),
            "past_project" => Some(RecordKind::PastProject),
            "branch" => Some(RecordKind::Branch),
            "unified_qualification" => Some(RecordKind::UnifiedQualification),
            "orderer_qualification" => Some(RecordKind::OrdererQualification),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    pub id: Option<String>,
    pub no: Scalar,
    pub name: Scalar,
    pub postal_code: Scalar,
    pub address: Scalar,
    pub phone: Scalar,
    pub fax: Scalar,
    pub email: Scalar,
    pub url: Scalar,
    pub survey_count: Scalar,
    pub rating: Scalar,
    pub result_count: Scalar,
    pub categories: Vec<String>,
    pub past_projects: Vec<PastProject>,
    pub representative: Scalar,
    pub established: Scalar,
    pub capital: Scalar,
    pub employee_count: Scalar,
    pub branches: Vec<PartnerBranch>,
    pub qualifications: Qualifications,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PastProject {
    pub evaluation_id: Option<String>,
    pub announcement_id: Option<String>,
    pub announcement_no: Scalar,
    pub announcement_title: Scalar,
    pub branch_name: Scalar,
    pub work_status: Scalar,
    pub evaluation_status: Scalar,
    pub priority: Scalar,
    pub bid_type: Scalar,
    pub category: Scalar,
    pub prefecture: Scalar,
    pub publish_date: Scalar,
    pub deadline: Scalar,
    pub evaluated_at: Scalar,
    pub organization: Scalar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartnerBranch {
    pub name: Scalar,
    pub address: Scalar,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Qualifications {
    pub unified: Vec<UnifiedQualification>,
    pub orderers: Vec<OrdererQualifications>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedQualification {
    pub main_category: Scalar,
    pub category: Scalar,
    pub region: Scalar,
    pub value: Scalar,
    pub grade: Scalar,
}

/// Qualifications granted by one orderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdererQualifications {
    pub orderer_name: Scalar,
    pub items: Vec<QualificationItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualificationItem {
    pub category: Scalar,
    pub region: Scalar,
    pub value: Scalar,
    pub grade: Scalar,
}

pub struct Partners;

impl Resource for Partners {
    type Entity = Partner;

    const NAME: &'static str = "partners";

    const COLUMNS: &'static [&'static str] = &[
        "partner_id",
        "partner_no",
        "partner_name",
        "postal_code",
        "address",
        "phone",
        "fax",
        "email",
        "url",
        "survey_count",
        "rating",
        "result_count",
        "representative",
        "established",
        "capital",
        "employee_count",
        "record_kind",
        "category_name",
        "project_evaluation_id",
        "project_announcement_no",
        "project_announcement_title",
        "project_branch_name",
        "project_work_status",
        "project_evaluation_status",
        "project_priority",
        "project_bid_type",
        "project_category",
        "project_prefecture",
        "project_publish_date",
        "project_deadline",
        "project_evaluated_at",
        "project_organization",
        "branch_name",
        "branch_address",
        "qual_main_category",
        "qual_orderer_name",
        "qual_category",
        "qual_region",
        "qual_value",
        "qual_grade",
    ];

    const TEMPLATE: QueryTemplate = QueryTemplate::new(
        r#"WITH picked AS (
    SELECT partner_id
    FROM {prefix}partners_master
    ORDER BY partner_id
    LIMIT {limit}
),
detail AS (
    SELECT partner_id, 'category' AS record_kind,
           categories AS category_name,
           CAST(NULL AS varchar) AS project_evaluation_id, CAST(NULL AS bigint) AS project_announcement_no,
           CAST(NULL AS varchar) AS project_announcement_title, CAST(NULL AS varchar) AS project_branch_name,
           CAST(NULL AS varchar) AS project_work_status, CAST(NULL AS varchar) AS project_evaluation_status,
           CAST(NULL AS bigint) AS project_priority, CAST(NULL AS varchar) AS project_bid_type,
           CAST(NULL AS varchar) AS project_category, CAST(NULL AS varchar) AS project_prefecture,
           CAST(NULL AS varchar) AS project_publish_date, CAST(NULL AS varchar) AS project_deadline,
           CAST(NULL AS varchar) AS project_evaluated_at, CAST(NULL AS varchar) AS project_organization,
           CAST(NULL AS varchar) AS branch_name, CAST(NULL AS varchar) AS branch_address,
           CAST(NULL AS varchar) AS qual_main_category, CAST(NULL AS varchar) AS qual_orderer_name,
           CAST(NULL AS varchar) AS qual_category, CAST(NULL AS varchar) AS qual_region,
           CAST(NULL AS varchar) AS qual_value, CAST(NULL AS varchar) AS qual_grade
    FROM {prefix}partners_categories
    UNION ALL
    SELECT partner_id, 'past_project',
           NULL,
           CAST(evaluation_id AS varchar), CAST(announcement_no AS bigint),
           announcement_title, branch_name,
           work_status, evaluation_status,
           CAST(priority AS bigint), bid_type,
           category, prefecture,
           publish_date, deadline,
           evaluated_at, organization,
           NULL, NULL,
           NULL, NULL, NULL, NULL, NULL, NULL
    FROM {prefix}partners_past_projects
    UNION ALL
    SELECT partner_id, 'branch',
           NULL,
           NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL,
           name, address,
           NULL, NULL, NULL, NULL, NULL, NULL
    FROM {prefix}partners_branches
    UNION ALL
    SELECT partner_id, 'unified_qualification',
           NULL,
           NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL,
           NULL, NULL,
           main_category, NULL, category, region, CAST(value AS varchar), grade
    FROM {prefix}partners_qualifications_unified
    UNION ALL
    SELECT partner_id, 'orderer_qualification',
           NULL,
           NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL,
           NULL, NULL,
           NULL, orderer_name, category, region, CAST(value AS varchar), grade
    FROM {prefix}partners_qualifications_orderer_items
)
SELECT
    pm.partner_id,
    pm.no                AS partner_no,
    pm.name              AS partner_name,
    pm.postal_code,
    pm.address,
    pm.phone,
    pm.fax,
    pm.email,
    pm.url,
    pm.survey_count,
    CAST(pm.rating AS bigint) AS rating,
    pm.result_count,
    pm.representative,
    pm.established,
    pm.capital,
    pm.employee_count,
    d.record_kind,
    d.category_name,
    d.project_evaluation_id,
    d.project_announcement_no,
    d.project_announcement_title,
    d.project_branch_name,
    d.project_work_status,
    d.project_evaluation_status,
    d.project_priority,
    d.project_bid_type,
    d.project_category,
    d.project_prefecture,
    d.project_publish_date,
    d.project_deadline,
    d.project_evaluated_at,
    d.project_organization,
    d.branch_name,
    d.branch_address,
    d.qual_main_category,
    d.qual_orderer_name,
    d.qual_category,
    d.qual_region,
    d.qual_value,
    d.qual_grade
FROM picked
JOIN {prefix}partners_master pm ON pm.partner_id = picked.partner_id
LEFT JOIN detail d ON d.partner_id = pm.partner_id
ORDER BY pm.partner_id, d.record_kind"#,
    );

    const FALLBACKS: FallbackPolicy = FallbackPolicy::new(&[
        ("established", Fallback::Date),
        ("project_publish_date", Fallback::Date),
        ("project_deadline", Fallback::Date),
        ("project_evaluated_at", Fallback::Date),
    ]);

    fn group(rows: &[FlatRow]) -> Grouped<Partner> {
        Grouper::new(|row: &FlatRow| row.text("partner_id"), head)
            .child(|partner: &mut Partner, row: &FlatRow| match RecordKind::of(row) {
                Some(RecordKind::Category) => {
                    if let Some(name) = row.text("category_name") {
                        partner.categories.push(name);
                    }
                }
                Some(RecordKind::PastProject) => partner.past_projects.push(past_project(row)),
                Some(RecordKind::Branch) => partner.branches.push(PartnerBranch {
                    name: row.value("branch_name"),
                    address: row.value("branch_address"),
                }),
                Some(RecordKind::UnifiedQualification) => {
                    partner.qualifications.unified.push(UnifiedQualification {
                        main_category: row.value("qual_main_category"),
                        category: row.value("qual_category"),
                        region: row.value("qual_region"),
                        value: row.value("qual_value"),
                        grade: row.value("qual_grade"),
                    })
                }
                Some(RecordKind::OrdererQualification) => {
                    let orderer_name = row.value("qual_orderer_name");
                    entry_by(
                        &mut partner.qualifications.orderers,
                        |o| o.orderer_name == orderer_name,
                        || OrdererQualifications {
                            orderer_name: orderer_name.clone(),
                            items: Vec::new(),
                        },
                    )
                    .items
                    .push(QualificationItem {
                        category: row.value("qual_category"),
                        region: row.value("qual_region"),
                        value: row.value("qual_value"),
                        grade: row.value("qual_grade"),
                    });
                }
                // partner with no detail rows at all
                None => {}
            })
            .run(rows)
    }
}

fn head(row: &FlatRow) -> Partner {
    Partner {
        id: IdPrefix::Partner.apply(row.get("partner_id")),
        no: row.value("partner_no"),
        name: row.value("partner_name"),
        postal_code: row.value("postal_code"),
        address: row.value("address"),
        phone: row.value("phone"),
        fax: row.value("fax"),
        email: row.value("email"),
        url: row.value("url"),
        survey_count: row.value("survey_count"),
        rating: row.value("rating"),
        result_count: row.value("result_count"),
        categories: Vec::new(),
        past_projects: Vec::new(),
        representative: row.value("representative"),
        established: row.value("established"),
        capital: row.value("capital"),
        employee_count: row.value("employee_count"),
        branches: Vec::new(),
        qualifications: Qualifications::default(),
    }
}

fn past_project(row: &FlatRow) -> PastProject {
    PastProject {
        evaluation_id: row.text("project_evaluation_id"),
        announcement_id: IdPrefix::Announcement.apply(row.get("project_announcement_no")),
        announcement_no: row.value("project_announcement_no"),
        announcement_title: row.value("project_announcement_title"),
        branch_name: row.value("project_branch_name"),
        work_status: row.value("project_work_status"),
        evaluation_status: row.value("project_evaluation_status"),
        priority: row.value("project_priority"),
        bid_type: row.value("project_bid_type"),
        category: row.value("project_category"),
        prefecture: row.value("project_prefecture"),
        publish_date: row.value("project_publish_date"),
        deadline: row.value("project_deadline"),
        evaluated_at: row.value("project_evaluated_at"),
        organization: row.value("project_organization"),
    }
}
