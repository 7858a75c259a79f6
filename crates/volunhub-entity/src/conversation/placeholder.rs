//! Display names used when a denormalized lookup finds no backing row.

use uuid::Uuid;

fn short_id(id: Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

pub fn organization_name(id: Uuid) -> String {
    format!("Organization {}", short_id(id))
}

pub fn volunteer_name(id: Uuid) -> String {
    format!("Volunteer {}", short_id(id))
}

pub fn opportunity_title(id: Uuid) -> String {
    format!("Opportunity {}", short_id(id))
}
