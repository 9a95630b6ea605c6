use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const DEFAULT_API_URL: &str = "http://localhost:4000/api";

#[derive(Parser)]
#[command(name = "workspaces")]
#[command(about = "Workspace CLI - manage workspaces over the REST API", long_about = None)]
struct Cli {
    /// Base URL of the workspace API
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Bearer token for authenticated commands
    #[arg(long, env = "WORKSPACES_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a slug is free and what would be assigned
    CheckSlug {
        /// Free text or slug to check
        slug: String,
    },
    /// Create a workspace
    Create {
        name: String,
        /// Explicit slug (normalized server-side); defaults to the name
        #[arg(short, long)]
        slug: Option<String>,
    },
    /// List your workspaces
    List,
    /// Show one workspace
    Show { id: String },
    /// Rename a workspace, optionally changing its slug
    Rename {
        id: String,
        name: String,
        #[arg(short, long)]
        slug: Option<String>,
    },
    /// Delete a workspace
    Delete { id: String },
}

#[derive(Serialize)]
struct WorkspaceInput {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    slug: Option<String>,
}

#[derive(Deserialize, Debug)]
struct Availability {
    available: bool,
    suggestion: String,
}

#[derive(Deserialize, Debug)]
struct Workspace {
    id: String,
    name: String,
    slug: String,
    #[serde(default)]
    created_at: Option<String>,
}

#[derive(Deserialize, Debug)]
struct WorkspaceEnvelope {
    workspace: Workspace,
}

#[derive(Deserialize, Debug)]
struct WorkspaceList {
    workspaces: Vec<Workspace>,
}

#[derive(Deserialize, Debug)]
struct ApiError {
    error: String,
    #[serde(default)]
    message: Option<String>,
}

struct ApiClient {
    base_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl ApiClient {
    fn new(base_url: String, token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder> {
        let token = self
            .token
            .as_deref()
            .context("a token is required: pass --token or set WORKSPACES_TOKEN")?;
        Ok(request.bearer_auth(token))
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .context("Failed to send request to workspace API")?;

        let status = response.status();
        if !status.is_success() {
            let detail = match response.json::<ApiError>().await {
                Ok(err) => match err.message {
                    Some(message) => format!("{}: {}", err.error, message),
                    None => err.error,
                },
                Err(_) => "no error details".to_string(),
            };
            return Err(anyhow::anyhow!("request failed with status {status}: {detail}"));
        }

        response
            .json()
            .await
            .context("Failed to parse workspace API response")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = ApiClient::new(cli.api_url, cli.token);

    match cli.command {
        Commands::CheckSlug { slug } => check_slug(&client, &slug).await?,
        Commands::Create { name, slug } => create_workspace(&client, name, slug).await?,
        Commands::List => list_workspaces(&client).await?,
        Commands::Show { id } => show_workspace(&client, &id).await?,
        Commands::Rename { id, name, slug } => rename_workspace(&client, &id, name, slug).await?,
        Commands::Delete { id } => delete_workspace(&client, &id).await?,
    }

    Ok(())
}

async fn check_slug(client: &ApiClient, slug: &str) -> Result<()> {
    let request = client
        .http
        .get(client.url("/workspaces/check-slug"))
        .query(&[("slug", slug)]);
    let availability: Availability = client.send(request).await?;

    if availability.available {
        println!("✓ '{}' is available", availability.suggestion);
    } else {
        println!("✗ taken; next free slug: {}", availability.suggestion);
    }
    Ok(())
}

async fn create_workspace(client: &ApiClient, name: String, slug: Option<String>) -> Result<()> {
    let request = client
        .authed(client.http.post(client.url("/workspaces")))?
        .json(&WorkspaceInput { name, slug });
    let created: WorkspaceEnvelope = client.send(request).await?;

    println!("✓ Workspace created successfully!");
    print_workspace(&created.workspace);
    Ok(())
}

async fn list_workspaces(client: &ApiClient) -> Result<()> {
    let request = client.authed(client.http.get(client.url("/workspaces")))?;
    let list: WorkspaceList = client.send(request).await?;

    if list.workspaces.is_empty() {
        println!("No workspaces yet.");
        return Ok(());
    }
    for workspace in &list.workspaces {
        println!("{:<28} {:<32} {}", workspace.id, workspace.slug, workspace.name);
    }
    Ok(())
}

async fn show_workspace(client: &ApiClient, id: &str) -> Result<()> {
    let request = client.authed(client.http.get(client.url(&format!("/workspaces/{id}"))))?;
    let shown: WorkspaceEnvelope = client.send(request).await?;
    print_workspace(&shown.workspace);
    Ok(())
}

async fn rename_workspace(
    client: &ApiClient,
    id: &str,
    name: String,
    slug: Option<String>,
) -> Result<()> {
    let request = client
        .authed(client.http.put(client.url(&format!("/workspaces/{id}"))))?
        .json(&WorkspaceInput { name, slug });
    let updated: WorkspaceEnvelope = client.send(request).await?;

    println!("✓ Workspace updated successfully!");
    print_workspace(&updated.workspace);
    Ok(())
}

async fn delete_workspace(client: &ApiClient, id: &str) -> Result<()> {
    let request = client.authed(client.http.delete(client.url(&format!("/workspaces/{id}"))))?;
    let _: serde_json::Value = client.send(request).await?;
    println!("✓ Workspace {id} deleted");
    Ok(())
}

fn print_workspace(workspace: &Workspace) {
    println!("  ID:   {}", workspace.id);
    println!("  Name: {}", workspace.name);
    println!("  Slug: {}", workspace.slug);
    if let Some(created_at) = &workspace.created_at {
        println!("  Created: {}", created_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_create_with_slug() {
        let cli = Cli::try_parse_from([
            "workspaces",
            "--token",
            "abc",
            "create",
            "My Team",
            "--slug",
            "team",
        ])
        .unwrap();

        assert_eq!(cli.token.as_deref(), Some("abc"));
        match cli.command {
            Commands::Create { name, slug } => {
                assert_eq!(name, "My Team");
                assert_eq!(slug.as_deref(), Some("team"));
            }
            _ => panic!("expected create"),
        }
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = ApiClient::new("http://localhost:4000/api/".to_string(), None);
        assert_eq!(client.url("/workspaces"), "http://localhost:4000/api/workspaces");
        assert!(client.authed(client.http.get(client.url("/workspaces"))).is_err());
    }
}
