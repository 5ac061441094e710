//! Dashboard API payloads

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// The Dashboard encodes an empty list as `null`.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Generic `{Status, Message, Meta}` envelope returned by most Dashboard calls
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardResponse {
    #[serde(rename = "Status", default)]
    pub status: String,

    #[serde(rename = "Message", default)]
    pub message: String,

    #[serde(rename = "Meta", default)]
    pub meta: serde_json::Value,
}

/// An organisation as listed by the admin API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Organisation {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub owner_name: String,

    #[serde(default)]
    pub cname: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganisationList {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub organisations: Vec<Organisation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateOrganisationRequest {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub owner_name: String,
    pub cname_enabled: bool,
    pub cname: String,
}

/// A Dashboard user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub email_address: String,

    #[serde(default)]
    pub access_key: String,

    #[serde(default)]
    pub org_id: String,
}

/// The users listing comes back either wrapped or as a bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UserList {
    Wrapped {
        #[serde(default, deserialize_with = "null_as_empty")]
        users: Vec<User>,
    },
    Bare(Vec<User>),
}

impl UserList {
    pub fn into_users(self) -> Vec<User> {
        match self {
            UserList::Wrapped { users } => users,
            UserList::Bare(users) => users,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub org_id: String,
    pub active: bool,
    pub user_permissions: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
    pub user_permissions: BTreeMap<String, String>,
}

/// Permissions granted to the bootstrap admin.
pub fn admin_permissions() -> BTreeMap<String, String> {
    BTreeMap::from([("IsAdmin".to_string(), "admin".to_string())])
}

#[derive(Debug, Clone, Serialize)]
pub struct InitCatalogueRequest {
    pub org_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CnameRequest {
    pub cname: String,
}

/// Classic portal homepage page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortalHomepage {
    pub is_homepage: bool,
    pub template_name: String,
    pub title: String,
    pub slug: String,
    pub fields: PortalFields,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PortalFields {
    #[serde(rename = "JumboCTATitle")]
    pub jumbo_cta_title: String,
    pub sub_heading: String,
    #[serde(rename = "JumboCTALink")]
    pub jumbo_cta_link: String,
    #[serde(rename = "JumboCTALinkTitle")]
    pub jumbo_cta_link_title: String,
    pub panel_one_content: String,
    pub panel_one_link: String,
    pub panel_one_link_title: String,
    pub panel_one_title: String,
    // The portal template reads this misspelled key too.
    pub panel_theree_content: String,
    pub panel_three_content: String,
    pub panel_three_link: String,
    pub panel_three_link_title: String,
    pub panel_three_title: String,
    pub panel_two_content: String,
    pub panel_two_link: String,
    pub panel_two_link_title: String,
    pub panel_two_title: String,
}

impl PortalHomepage {
    /// The fixed homepage created on a fresh portal.
    pub fn default_homepage() -> Self {
        Self {
            is_homepage: true,
            template_name: String::new(),
            title: "Developer portal name".to_string(),
            slug: "/".to_string(),
            fields: PortalFields {
                jumbo_cta_title: "Tyk Developer Portal".to_string(),
                sub_heading: "Sub Header".to_string(),
                jumbo_cta_link: "#cta".to_string(),
                jumbo_cta_link_title: "Your awesome APIs, hosted with Tyk!".to_string(),
                panel_one_content: "Panel 1 content.".to_string(),
                panel_one_link: "#panel1".to_string(),
                panel_one_link_title: "Panel 1 Button".to_string(),
                panel_one_title: "Panel 1 Title".to_string(),
                panel_theree_content: String::new(),
                panel_three_content: "Panel 3 content.".to_string(),
                panel_three_link: "#panel3".to_string(),
                panel_three_link_title: "Panel 3 Button".to_string(),
                panel_three_title: "Panel 3 Title".to_string(),
                panel_two_content: "Panel 2 content.".to_string(),
                panel_two_link: "#panel2".to_string(),
                panel_two_link_title: "Panel 2 Button".to_string(),
                panel_two_title: "Panel 2 Title".to_string(),
            },
        }
    }
}
