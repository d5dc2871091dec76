use bidboard_core::{FlatRow, Scalar};
use serde::Serialize;

use crate::fallback::{Fallback, FallbackPolicy};
use crate::fields::IdPrefix;
use crate::group::{push_unique, push_unique_by, Grouped, Grouper};
use crate::resource::Resource;
use crate::template::QueryTemplate;

/// A company office.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Branch {
    pub id: Option<String>,
    pub name: Scalar,
    pub address: Scalar,
}

impl Branch {
    /// `None` when the row carries no office (left-join miss).
    pub(crate) fn from_row(row: &FlatRow) -> Option<Self> {
        let id = IdPrefix::Branch.apply(row.get("office_no"))?;
        Some(Self {
            id: Some(id),
            name: row.value("office_name"),
            address: row.value("office_address"),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Option<String>,
    pub no: Scalar,
    pub name: Scalar,
    pub address: Scalar,
    pub grade: Scalar,
    pub priority: Scalar,
    pub phone: Scalar,
    pub email: Scalar,
    pub representative: Scalar,
    pub established: Scalar,
    pub capital: Scalar,
    pub employee_count: Scalar,
    pub branches: Vec<Branch>,
    pub certifications: Vec<String>,
}

pub struct Companies;

impl Resource for Companies {
    type Entity = Company;

    const NAME: &'static str = "companies";

    const COLUMNS: &'static [&'static str] = &[
        "company_no",
        "company_name",
        "company_address",
        "grade",
        "priority",
        "phone",
        "email",
        "representative",
        "established",
        "capital",
        "employee_count",
        "office_no",
        "office_name",
        "office_address",
        "certification",
    ];

    const TEMPLATE: QueryTemplate = QueryTemplate::new(
        r#"WITH picked AS (
    SELECT company_no
    FROM {prefix}company_master
    ORDER BY company_no
    LIMIT {limit}
)
SELECT
    comp.company_no,
    comp.company_name,
    comp.company_address,
    comp.grade,
    comp.priority,
    comp.telephone              AS phone,
    comp.email,
    comp.name_of_representative AS representative,
    comp.establishment_date     AS established,
    comp.capital,
    comp.employee_count,
    office.office_no,
    office.office_name,
    office.office_address,
    cert.certification
FROM picked
JOIN {prefix}company_master comp ON comp.company_no = picked.company_no
LEFT JOIN {prefix}office_master office ON office.company_no = comp.company_no
LEFT JOIN {prefix}company_certifications cert ON cert.company_no = comp.company_no
ORDER BY comp.company_no, office.office_no"#,
    );

    const FALLBACKS: FallbackPolicy = FallbackPolicy::new(&[("established", Fallback::Date)]);

    fn group(rows: &[FlatRow]) -> Grouped<Company> {
        Grouper::new(|row: &FlatRow| row.text("company_no"), head)
            .child(|company: &mut Company, row: &FlatRow| {
                if let Some(branch) = Branch::from_row(row) {
                    push_unique_by(&mut company.branches, branch, |b| b.id.clone());
                }
            })
            .child(|company: &mut Company, row: &FlatRow| {
                if let Some(cert) = row.text("certification") {
                    push_unique(&mut company.certifications, cert);
                }
            })
            .run(rows)
    }
}

fn head(row: &FlatRow) -> Company {
    Company {
        id: IdPrefix::Company.apply(row.get("company_no")),
        no: row.value("company_no"),
        name: row.value("company_name"),
        address: row.value("company_address"),
        grade: row.value("grade"),
        priority: row.value("priority"),
        phone: row.value("phone"),
        email: row.value("email"),
        representative: row.value("representative"),
        established: row.value("established"),
        capital: row.value("capital"),
        employee_count: row.value("employee_count"),
        branches: Vec::new(),
        certifications: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limit::Limit;
    use crate::resource::materialize;

    fn row(company: i64, office: Option<i64>, cert: Option<&str>) -> FlatRow {
        FlatRow::new()
            .with("company_no", company)
            .with("company_name", "Kanto Kensetsu")
            .with("grade", "A")
            .with("office_no", office)
            .with("office_name", office.map(|o| format!("Office {o}")))
            .with("office_address", "Tokyo")
            .with("certification", cert)
    }

    #[test]
    fn branches_and_certifications_are_deduplicated() {
        // office x cert cross product from the two left joins
        let rows = vec![
            row(42, Some(1), Some("ISO9001")),
            row(42, Some(1), Some("ISO14001")),
            row(42, Some(2), Some("ISO9001")),
            row(42, Some(2), Some("ISO14001")),
        ];
        let out = materialize::<Companies>(rows, Limit::default());
        assert_eq!(out.len(), 1);
        let c = &out[0];
        assert_eq!(c.id.as_deref(), Some("com-42"));
        let ids: Vec<_> = c.branches.iter().map(|b| b.id.as_deref().unwrap()).collect();
        assert_eq!(ids, vec!["brn-1", "brn-2"]);
        assert_eq!(c.certifications, vec!["ISO9001", "ISO14001"]);
    }

    #[test]
    fn company_without_offices_or_certs() {
        let out = materialize::<Companies>(vec![row(7, None, None)], Limit::default());
        assert!(out[0].branches.is_empty());
        assert!(out[0].certifications.is_empty());
        let json = serde_json::to_value(&out[0]).unwrap();
        assert_eq!(json["established"], "1900-01-01");
        assert_eq!(json["employeeCount"], serde_json::Value::Null);
    }

    #[test]
    fn template_selects_every_contract_column() {
        let sql = Companies::TEMPLATE.text();
        for col in Companies::COLUMNS {
            assert!(sql.contains(col), "{col} not selected");
        }
    }
}
