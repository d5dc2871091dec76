use bidboard_core::{FlatRow, Scalar};
use serde::Serialize;

use crate::fallback::{Fallback, FallbackPolicy};
use crate::fields::IdPrefix;
use crate::group::{push_unique, Grouped, Grouper};
use crate::resource::Resource;
use crate::template::QueryTemplate;

/// A contracting authority with its departments and award statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Orderer {
    pub id: Option<String>,
    pub no: Scalar,
    pub name: Scalar,
    pub category: Scalar,
    pub address: Scalar,
    pub phone: Scalar,
    pub fax: Scalar,
    pub email: Scalar,
    pub departments: Vec<String>,
    pub announcement_count: Scalar,
    pub award_count: Scalar,
    pub average_amount: Scalar,
    pub last_announcement_date: Scalar,
}

pub struct Orderers;

impl Resource for Orderers {
    type Entity = Orderer;

    const NAME: &'static str = "orderers";

    const COLUMNS: &'static [&'static str] = &[
        "orderer_no",
        "orderer_name",
        "category",
        "address",
        "phone",
        "fax",
        "email",
        "department_name",
        "announcement_count",
        "award_count",
        "average_amount",
        "last_announcement_date",
    ];

    const TEMPLATE: QueryTemplate = QueryTemplate::new(
        r#"WITH picked AS (
    SELECT orderer_no
    FROM {prefix}orderer_master
    ORDER BY orderer_no
    LIMIT {limit}
),
activity AS (
    SELECT
        anno.orderer_no,
        COUNT(DISTINCT anno.announcement_no)     AS announcement_count,
        COUNT(DISTINCT res.announcement_no)      AS award_count,
        AVG(res.actual_amount)                   AS average_amount,
        MAX(anno.publish_date)                   AS last_announcement_date
    FROM {prefix}bid_announcements anno
    LEFT JOIN {prefix}bid_results res ON res.announcement_no = anno.announcement_no
    GROUP BY anno.orderer_no
)
SELECT
    ord.orderer_no,
    ord.orderer_name,
    ord.category,
    ord.address,
    ord.telephone AS phone,
    ord.fax,
    ord.email,
    dept.department_name,
    act.announcement_count,
    act.award_count,
    act.average_amount,
    act.last_announcement_date
FROM picked
JOIN {prefix}orderer_master ord ON ord.orderer_no = picked.orderer_no
LEFT JOIN {prefix}orderer_departments dept ON dept.orderer_no = ord.orderer_no
LEFT JOIN activity act ON act.orderer_no = ord.orderer_no
ORDER BY ord.orderer_no, dept.department_name"#,
    );

    const FALLBACKS: FallbackPolicy =
        FallbackPolicy::new(&[("last_announcement_date", Fallback::Date)]);

    fn group(rows: &[FlatRow]) -> Grouped<Orderer> {
        Grouper::new(|row: &FlatRow| row.text("orderer_no"), head)
            .child(|orderer: &mut Orderer, row: &FlatRow| {
                if let Some(dept) = row.text("department_name") {
                    push_unique(&mut orderer.departments, dept);
                }
            })
            .run(rows)
    }
}

fn head(row: &FlatRow) -> Orderer {
    Orderer {
        id: IdPrefix::Orderer.apply(row.get("orderer_no")),
        no: row.value("orderer_no"),
        name: row.value("orderer_name"),
        category: row.value("category"),
        address: row.value("address"),
        phone: row.value("phone"),
        fax: row.value("fax"),
        email: row.value("email"),
        departments: Vec::new(),
        announcement_count: row.value("announcement_count"),
        award_count: row.value("award_count"),
        average_amount: row.value("average_amount"),
        last_announcement_date: row.value("last_announcement_date"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limit::Limit;
    use crate::resource::materialize;

    fn row(no: i64, dept: Option<&str>) -> FlatRow {
        FlatRow::new()
            .with("orderer_no", no)
            .with("orderer_name", "Prefectural Office")
            .with("category", "prefecture")
            .with("department_name", dept)
            .with("announcement_count", 12i64)
            .with("average_amount", 1800.5)
    }

    #[test]
    fn departments_unique_in_first_seen_order() {
        let rows = vec![
            row(5, Some("Roads")),
            row(5, Some("Water")),
            row(5, Some("Roads")),
            row(6, None),
        ];
        let out = materialize::<Orderers>(rows, Limit::default());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].id.as_deref(), Some("ord-5"));
        assert_eq!(out[0].departments, vec!["Roads", "Water"]);
        assert!(out[1].departments.is_empty());

        let json = serde_json::to_value(&out[0]).unwrap();
        assert_eq!(json["announcementCount"], 12);
        assert_eq!(json["averageAmount"], 1800.5);
        assert_eq!(json["lastAnnouncementDate"], "1900-01-01");
    }

    #[test]
    fn truncates_to_limit() {
        let rows: Vec<FlatRow> = (1..=5).map(|n| row(n, Some("Roads"))).collect();
        let out = materialize::<Orderers>(rows, Limit::new(3).unwrap());
        assert_eq!(out.len(), 3);
        assert_eq!(out[2].id.as_deref(), Some("ord-3"));
    }

    #[test]
    fn template_selects_every_contract_column() {
        let sql = Orderers::TEMPLATE.text();
        for col in Orderers::COLUMNS {
            assert!(sql.contains(col), "{col} not selected");
        }
    }
}
