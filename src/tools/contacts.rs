//! Address book tools: contacts and contact groups.

use serde::Deserialize;
use serde_json::{json, Value};

use super::{define, parse_args, ToolError};
use crate::mcp::protocol::ToolDefinition;
use crate::wesign::models::Contact;
use crate::wesign::requests::{ContactDraft, ContactGroupDraft};
use crate::wesign::WeSignClient;

const DEFAULT_LIMIT: u32 = 100;

fn contact_properties() -> serde_json::Map<String, Value> {
    let mut properties = serde_json::Map::new();
    for (key, description) in [
        ("firstName", "First name"),
        ("lastName", "Last name"),
        ("email", "Email address"),
        ("phone", "Phone number"),
        ("company", "Company name"),
        ("notes", "Free-form notes"),
        ("groupId", "ID of the contact group to add the contact to"),
    ] {
        properties.insert(
            key.to_string(),
            json!({ "type": "string", "description": description }),
        );
    }
    properties
}

fn group_schema(with_id: bool) -> Value {
    let mut properties = serde_json::Map::new();
    let mut required = vec!["name"];
    if with_id {
        properties.insert(
            "groupId".to_string(),
            json!({ "type": "string", "description": "ID of the contact group" }),
        );
        required.insert(0, "groupId");
    }
    properties.insert(
        "name".to_string(),
        json!({ "type": "string", "description": "Group name" }),
    );
    properties.insert(
        "description".to_string(),
        json!({ "type": "string", "description": "Group description" }),
    );
    properties.insert(
        "contactIds".to_string(),
        json!({
            "type": "array",
            "items": { "type": "string" },
            "description": "IDs of contacts in the group"
        }),
    );
    json!({ "type": "object", "properties": properties, "required": required })
}

fn id_schema(key: &str, description: &str) -> Value {
    json!({
        "type": "object",
        "properties": { key: { "type": "string", "description": description } },
        "required": [key]
    })
}

fn paging_properties() -> Value {
    json!({
        "offset": { "type": "number", "minimum": 0, "description": "Number of records to skip (default: 0)" },
        "limit": { "type": "number", "minimum": 1, "description": "Maximum number of records to return (default: 100)" }
    })
}

/// Catalog entries for the address book tools.
#[must_use]
pub fn definitions() -> Vec<ToolDefinition> {
    let mut update_properties = contact_properties();
    update_properties.insert(
        "contactId".to_string(),
        json!({ "type": "string", "description": "ID of the contact to update" }),
    );

    let mut list_properties = paging_properties();
    list_properties["query"] =
        json!({ "type": "string", "description": "Search by name, email or phone" });
    list_properties["groupId"] =
        json!({ "type": "string", "description": "Only contacts in this group" });

    vec![
        define(
            "wesign_create_contact",
            "Create a new contact in the address book",
            json!({
                "type": "object",
                "properties": contact_properties(),
                "required": ["firstName", "lastName"]
            }),
        ),
        define(
            "wesign_create_contacts_bulk",
            "Create several contacts in one call",
            json!({
                "type": "object",
                "properties": {
                    "contacts": {
                        "type": "array",
                        "description": "Contacts to create",
                        "items": {
                            "type": "object",
                            "properties": contact_properties(),
                            "required": ["firstName", "lastName"]
                        }
                    }
                },
                "required": ["contacts"]
            }),
        ),
        define(
            "wesign_list_contacts",
            "List or search contacts in the address book",
            json!({ "type": "object", "properties": list_properties }),
        ),
        define(
            "wesign_get_contact",
            "Get details of a contact",
            id_schema("contactId", "ID of the contact"),
        ),
        define(
            "wesign_update_contact",
            "Update a contact. Omitted fields keep their current value",
            json!({
                "type": "object",
                "properties": update_properties,
                "required": ["contactId"]
            }),
        ),
        define(
            "wesign_delete_contact",
            "Delete a contact from the address book",
            id_schema("contactId", "ID of the contact to delete"),
        ),
        define(
            "wesign_delete_contacts_batch",
            "Delete several contacts in one call",
            json!({
                "type": "object",
                "properties": {
                    "contactIds": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "IDs of the contacts to delete"
                    }
                },
                "required": ["contactIds"]
            }),
        ),
        define(
            "wesign_list_contact_groups",
            "List contact groups",
            json!({ "type": "object", "properties": paging_properties() }),
        ),
        define(
            "wesign_get_contact_group",
            "Get details of a contact group",
            id_schema("groupId", "ID of the contact group"),
        ),
        define(
            "wesign_create_contact_group",
            "Create a contact group",
            group_schema(false),
        ),
        define(
            "wesign_update_contact_group",
            "Update a contact group",
            group_schema(true),
        ),
        define(
            "wesign_delete_contact_group",
            "Delete a contact group. Its contacts stay in the address book",
            id_schema("groupId", "ID of the contact group to delete"),
        ),
    ]
}

#[derive(Deserialize)]
struct BulkArgs {
    contacts: Vec<ContactDraft>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListArgs {
    query: Option<String>,
    group_id: Option<String>,
    #[serde(default)]
    offset: u32,
    limit: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateArgs {
    contact_id: String,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    company: Option<String>,
    notes: Option<String>,
    group_id: Option<String>,
}

impl UpdateArgs {
    /// Overlays the supplied fields on the stored contact.
    fn merge(self, current: Contact) -> ContactDraft {
        ContactDraft {
            first_name: self.first_name.unwrap_or(current.first_name),
            last_name: self.last_name.unwrap_or(current.last_name),
            email: self.email.or(current.email),
            phone: self.phone.or(current.phone),
            company: self.company.or(current.company),
            notes: self.notes.or(current.notes),
            group_id: self.group_id.or(current.group_id),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdsArgs {
    contact_ids: Vec<String>,
}

#[derive(Deserialize)]
struct PageArgs {
    #[serde(default)]
    offset: u32,
    limit: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupArgs {
    group_id: Option<String>,
    name: String,
    description: Option<String>,
    contact_ids: Option<Vec<String>>,
}

impl GroupArgs {
    fn draft(&self) -> ContactGroupDraft {
        ContactGroupDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            contact_ids: self.contact_ids.clone(),
        }
    }
}

fn contact_name(first: &str, last: &str) -> String {
    format!("{first} {last}").trim().to_string()
}

/// Executes an address book tool.
///
/// # Errors
///
/// Returns argument or upstream errors.
pub async fn call(client: &WeSignClient, name: &str, arguments: &Value) -> Result<Value, ToolError> {
    match name {
        "wesign_create_contact" => {
            let draft: ContactDraft = parse_args(arguments)?;
            let contact = client
                .create_contact(&draft)
                .await
                .map_err(ToolError::upstream("Failed to create contact"))?;
            Ok(json!({
                "success": true,
                "message": format!(
                    "Contact \"{}\" created successfully",
                    contact_name(&draft.first_name, &draft.last_name)
                ),
                "contact": contact,
            }))
        }
        "wesign_create_contacts_bulk" => {
            let args: BulkArgs = parse_args(arguments)?;
            let created = client
                .create_contacts_bulk(&args.contacts)
                .await
                .map_err(ToolError::upstream("Failed to create contacts in bulk"))?;
            Ok(json!({
                "success": true,
                "message": format!("Created {} contact(s)", args.contacts.len()),
                "totalCreated": args.contacts.len(),
                "contacts": created,
            }))
        }
        "wesign_list_contacts" => list(client, parse_args(arguments)?).await,
        "wesign_get_contact" => {
            let id = super::required_str(arguments, "contactId")?;
            let contact = client
                .contact(id)
                .await
                .map_err(ToolError::upstream("Failed to get contact"))?;
            Ok(json!({
                "success": true,
                "message": format!(
                    "Retrieved contact: {}",
                    contact_name(&contact.first_name, &contact.last_name)
                ),
                "contact": contact,
            }))
        }
        "wesign_update_contact" => update(client, parse_args(arguments)?).await,
        "wesign_delete_contact" => {
            let id = super::required_str(arguments, "contactId")?;
            client
                .delete_contact(id)
                .await
                .map_err(ToolError::upstream("Failed to delete contact"))?;
            Ok(json!({
                "success": true,
                "message": "Contact deleted successfully",
                "contactId": id,
            }))
        }
        "wesign_delete_contacts_batch" => {
            let args: IdsArgs = parse_args(arguments)?;
            client
                .delete_contacts_batch(&args.contact_ids)
                .await
                .map_err(ToolError::upstream("Failed to delete contacts"))?;
            Ok(json!({
                "success": true,
                "message": format!("Deleted {} contact(s)", args.contact_ids.len()),
                "deletedCount": args.contact_ids.len(),
                "contactIds": args.contact_ids,
            }))
        }
        "wesign_list_contact_groups" => {
            let args: PageArgs = parse_args(arguments)?;
            let groups = client
                .contact_groups(args.offset, args.limit.unwrap_or(DEFAULT_LIMIT))
                .await
                .map_err(ToolError::upstream("Failed to list contact groups"))?;
            Ok(json!({
                "success": true,
                "message": format!("Found {} contact group(s)", groups.len()),
                "count": groups.len(),
                "groups": groups,
            }))
        }
        "wesign_get_contact_group" => {
            let id = super::required_str(arguments, "groupId")?;
            let group = client
                .contact_group(id)
                .await
                .map_err(ToolError::upstream("Failed to get contact group"))?;
            Ok(json!({
                "success": true,
                "message": format!("Retrieved contact group: {}", group.name),
                "group": group,
            }))
        }
        "wesign_create_contact_group" => {
            let args: GroupArgs = parse_args(arguments)?;
            let group = client
                .create_contact_group(&args.draft())
                .await
                .map_err(ToolError::upstream("Failed to create contact group"))?;
            Ok(json!({
                "success": true,
                "message": format!("Contact group \"{}\" created successfully", args.name),
                "group": group,
            }))
        }
        "wesign_update_contact_group" => {
            let args: GroupArgs = parse_args(arguments)?;
            let id = args
                .group_id
                .as_deref()
                .ok_or_else(|| ToolError::invalid("missing required parameter: groupId"))?;
            let group = client
                .update_contact_group(id, &args.draft())
                .await
                .map_err(ToolError::upstream("Failed to update contact group"))?;
            Ok(json!({
                "success": true,
                "message": "Contact group updated successfully",
                "group": group,
            }))
        }
        "wesign_delete_contact_group" => {
            let id = super::required_str(arguments, "groupId")?;
            client
                .delete_contact_group(id)
                .await
                .map_err(ToolError::upstream("Failed to delete contact group"))?;
            Ok(json!({
                "success": true,
                "message": "Contact group deleted successfully (contacts remain in address book)",
                "groupId": id,
            }))
        }
        _ => Err(ToolError::UnknownTool(name.to_string())),
    }
}

async fn list(client: &WeSignClient, args: ListArgs) -> Result<Value, ToolError> {
    let limit = args.limit.unwrap_or(DEFAULT_LIMIT);
    let contacts = client
        .contacts(args.query.as_deref(), args.group_id.as_deref(), args.offset, limit)
        .await
        .map_err(ToolError::upstream("Failed to list contacts"))?;

    Ok(json!({
        "success": true,
        "message": format!("Found {} contact(s)", contacts.len()),
        "count": contacts.len(),
        "filters": {
            "query": args.query.as_deref().unwrap_or("none"),
            "groupId": args.group_id.as_deref().unwrap_or("none"),
            "offset": args.offset,
            "limit": limit,
        },
        "contacts": contacts,
    }))
}

async fn update(client: &WeSignClient, args: UpdateArgs) -> Result<Value, ToolError> {
    let context = "Failed to update contact";
    let current = client
        .contact(&args.contact_id)
        .await
        .map_err(ToolError::upstream(context))?;
    let id = args.contact_id.clone();
    let draft = args.merge(current);

    let contact = client
        .update_contact(&id, &draft)
        .await
        .map_err(ToolError::upstream(context))?;

    Ok(json!({
        "success": true,
        "message": "Contact updated successfully",
        "contact": contact,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_keeps_unspecified_fields() {
        let current = Contact {
            id: "c1".to_string(),
            first_name: "Dana".to_string(),
            last_name: "Levi".to_string(),
            email: Some("dana@example.com".to_string()),
            phone: Some("0501234567".to_string()),
            ..Contact::default()
        };
        let args: UpdateArgs =
            parse_args(&json!({ "contactId": "c1", "lastName": "Cohen" })).unwrap();

        let draft = args.merge(current);
        assert_eq!(draft.first_name, "Dana");
        assert_eq!(draft.last_name, "Cohen");
        assert_eq!(draft.email.as_deref(), Some("dana@example.com"));
        assert_eq!(draft.phone.as_deref(), Some("0501234567"));
    }

    #[test]
    fn group_schema_requires_id_only_for_updates() {
        assert_eq!(group_schema(false)["required"], json!(["name"]));
        assert_eq!(group_schema(true)["required"], json!(["groupId", "name"]));
    }
}
