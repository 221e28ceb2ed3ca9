use chrono::{DateTime, Duration, TimeZone, Utc};
use rusqlite::{params, Connection};

use crate::value::Value;

/// Populate the deterministic demo dataset: eleven equipment rows, two
/// batches, and nine base operations cloned one week apart per batch.
///
/// Runs at most once per fresh database; the store only calls this when the
/// schema was just created and the equipment table is empty.
pub(crate) fn demo_data(conn: &Connection) -> rusqlite::Result<()> {
    let now = Value::timestamp_text(Utc::now());

    let equipment = [
        ("1", "V-3300A", "3A Fermenter"),
        ("2", "V-3300B", "3B Fermenter"),
        ("3", "V-3300C", "3C Fermenter"),
        ("4", "V-3300D", "3D Fermenter"),
        ("5", "V-3300E", "3E Fermenter"),
        ("6", "V-3300F", "3F Fermenter"),
        ("7", "U-4000", "Centrifuge"),
        ("8", "U-4400", "Decanter"),
        ("9", "U-4600", "Homogenizer"),
        ("10", "U-4700", "Ceramic Skid"),
        ("11", "U-4500", "Ultrafilter"),
    ];
    for (index, (id, tag, description)) in equipment.iter().enumerate() {
        conn.execute(
            r#"
            INSERT INTO equipment (
              equipment_id, tag, description, tag_and_description, sort_order,
              created_on, modified_on, owner_id, owner_name, owner_kind,
              owner_yomi_name, state_code
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6, 'system', 'System', 'systemuser', '', '0')
            "#,
            params![
                id,
                tag,
                description,
                format!("{tag} - {description}"),
                index as i64,
                now
            ],
        )?;
    }

    let batch_numbers = ["25-HTS-30", "25-HTS-31"];
    for number in batch_numbers {
        conn.execute(
            r#"
            INSERT INTO batches (
              batches_id, batch_number, created_on, modified_on,
              owner_id, owner_name, owner_kind, owner_yomi_name, state_code
            ) VALUES (?1, ?1, ?2, ?2, 'system', 'System', 'systemuser', '', '0')
            "#,
            params![number, now],
        )?;
    }

    // (id, equipment, description, start, end)
    let base_ops = [
        ("1", "1", "Fermentation", ts(2025, 8, 28, 0), ts(2025, 9, 2, 12)),
        ("2", "7", "Centrifugation", ts(2025, 9, 2, 9), ts(2025, 9, 2, 12)),
        ("3", "3", "Lyse buffer", ts(2025, 9, 2, 9), ts(2025, 9, 3, 0)),
        ("4", "9", "Homogenization", ts(2025, 9, 2, 14), ts(2025, 9, 3, 0)),
        ("5", "6", "Lysate holding", ts(2025, 9, 2, 14), ts(2025, 9, 5, 12)),
        ("6", "10", "Clarification", ts(2025, 9, 3, 0), ts(2025, 9, 5, 12)),
        ("7", "11", "Concentration", ts(2025, 9, 3, 0), ts(2025, 9, 5, 18)),
        ("8", "4", "Dextrose feed", ts(2025, 8, 29, 0), ts(2025, 9, 2, 12)),
        ("9", "2", "Fermentation", ts(2025, 8, 28, 0), ts(2025, 9, 2, 12)),
    ];

    for (batch_index, batch) in batch_numbers.iter().enumerate() {
        let shift = Duration::weeks(batch_index as i64);
        for (id, equipment_id, description, start, end) in &base_ops {
            let op_id = if batch_index == 0 {
                (*id).to_string()
            } else {
                let n: i64 = id.parse().expect("numeric seed operation id");
                (n + 10).to_string()
            };
            conn.execute(
                r#"
                INSERT INTO operations (
                  operations_id, equipment_id, batch_id, start_time, end_time,
                  kind, description, created_on, modified_on, state_code, status_code
                ) VALUES (?1, ?2, ?3, ?4, ?5, 'Production', ?6, ?7, ?7, '0', '0')
                "#,
                params![
                    op_id,
                    equipment_id,
                    batch,
                    Value::timestamp_text(*start + shift),
                    Value::timestamp_text(*end + shift),
                    description,
                    now
                ],
            )?;
        }
    }

    Ok(())
}

fn ts(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .expect("valid seed timestamp")
}
