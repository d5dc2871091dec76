use bidboard_core::{FlatRow, Scalar};
use serde::Serialize;

use crate::fallback::{Fallback, FallbackPolicy};
use crate::fields::IdPrefix;
use crate::group::{Grouped, Grouper};
use crate::resource::Resource;
use crate::template::QueryTemplate;

/// Issuing department contact block, built from `department_*` columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub postal_code: Scalar,
    pub address: Scalar,
    pub name: Scalar,
    pub contact_person: Scalar,
    pub phone: Scalar,
    pub fax: Scalar,
    pub email: Scalar,
}

impl Department {
    pub(crate) fn from_row(row: &FlatRow) -> Self {
        Self {
            postal_code: row.value("department_postalcode"),
            address: row.value("department_address"),
            name: row.value("department_name"),
            contact_person: row.value("department_contact_person"),
            phone: row.value("department_phone"),
            fax: row.value("department_fax"),
            email: row.value("department_email"),
        }
    }
}

pub(crate) const DEPARTMENT_COLUMNS: [&str; 7] = [
    "department_postalcode",
    "department_address",
    "department_name",
    "department_contact_person",
    "department_phone",
    "department_fax",
    "department_email",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: Option<String>,
    pub no: Scalar,
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
    pub status: Scalar,
    pub actual_amount: Scalar,
    pub winning_company_id: Option<String>,
    pub winning_company_name: Scalar,
}

pub struct Announcements;

impl Resource for Announcements {
    type Entity = Announcement;

    const NAME: &'static str = "announcements";

    const COLUMNS: &'static [&'static str] = &[
        "announcement_no",
        "orderer_no",
        "title",
        "category",
        "organization",
        "work_location",
        DEPARTMENT_COLUMNS[0],
        DEPARTMENT_COLUMNS[1],
        DEPARTMENT_COLUMNS[2],
        DEPARTMENT_COLUMNS[3],
        DEPARTMENT_COLUMNS[4],
        DEPARTMENT_COLUMNS[5],
        DEPARTMENT_COLUMNS[6],
        "publish_date",
        "explanation_start_date",
        "explanation_end_date",
        "application_start_date",
        "application_end_date",
        "bid_start_date",
        "bid_end_date",
        "deadline",
        "estimated_amount_min",
        "estimated_amount_max",
        "status",
        "actual_amount",
        "winning_company_no",
        "winning_company_name",
    ];

    const TEMPLATE: QueryTemplate = QueryTemplate::new(
        r#"WITH picked AS (
    SELECT announcement_no
    FROM {prefix}bid_announcements
    ORDER BY announcement_no
    LIMIT {limit}
)
SELECT
    anno.announcement_no,
    anno.orderer_no,
    anno.work_name           AS title,
    anno.category,
    anno.top_agency_name     AS organization,
    anno.work_place          AS work_location,
    anno.zipcode             AS department_postalcode,
    anno.address             AS department_address,
    anno.department          AS department_name,
    anno.assignee_name       AS department_contact_person,
    anno.telephone           AS department_phone,
    anno.fax                 AS department_fax,
    anno.mail                AS department_email,
    anno.publish_date,
    anno.doc_dist_start      AS explanation_start_date,
    anno.doc_dist_end        AS explanation_end_date,
    anno.submission_start    AS application_start_date,
    anno.submission_end      AS application_end_date,
    anno.bid_start_date,
    anno.bid_end_date,
    anno.bid_end_date        AS deadline,
    anno.estimated_amount_min,
    anno.estimated_amount_max,
    res.status,
    res.actual_amount,
    res.winning_company_no,
    res.winning_company_name
FROM picked
JOIN {prefix}bid_announcements anno ON anno.announcement_no = picked.announcement_no
LEFT JOIN {prefix}bid_results res ON res.announcement_no = anno.announcement_no
ORDER BY anno.announcement_no"#,
    );

    const FALLBACKS: FallbackPolicy = FallbackPolicy::new(&[
        ("publish_date", Fallback::Date),
        ("explanation_start_date", Fallback::Date),
        ("explanation_end_date", Fallback::Date),
        ("application_start_date", Fallback::Date),
        ("application_end_date", Fallback::Date),
        ("bid_start_date", Fallback::Date),
        ("bid_end_date", Fallback::Date),
        ("deadline", Fallback::Date),
    ]);

    fn group(rows: &[FlatRow]) -> Grouped<Announcement> {
        Grouper::new(|row: &FlatRow| row.text("announcement_no"), head).run(rows)
    }
}

fn head(row: &FlatRow) -> Announcement {
    Announcement {
        id: IdPrefix::Announcement.apply(row.get("announcement_no")),
        no: row.value("announcement_no"),
        orderer_id: IdPrefix::Orderer.apply(row.get("orderer_no")),
        title: row.value("title"),
        category: row.value("category"),
        organization: row.value("organization"),
        work_location: row.value("work_location"),
        department: Department::from_row(row),
        publish_date: row.value("publish_date"),
        explanation_start_date: row.value("explanation_start_date"),
        explanation_end_date: row.value("explanation_end_date"),
        application_start_date: row.value("application_start_date"),
        application_end_date: row.value("application_end_date"),
        bid_start_date: row.value("bid_start_date"),
        bid_end_date: row.value("bid_end_date"),
        deadline: row.value("deadline"),
        estimated_amount_min: row.value("estimated_amount_min"),
        estimated_amount_max: row.value("estimated_amount_max"),
        status: row.value("status"),
        actual_amount: row.value("actual_amount"),
        winning_company_id: IdPrefix::Company.apply(row.get("winning_company_no")),
        winning_company_name: row.value("winning_company_name"),
    }
}
