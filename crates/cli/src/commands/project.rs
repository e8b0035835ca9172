//! `notewise project`: project management.

use notewise_core::error::StoreError;
use notewise_core::skill::ProjectId;
use notewise_core::store::SkillStore;
use std::sync::Arc;

pub async fn add(store: Arc<dyn SkillStore>, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let project = store.create_project(name).await?;
    println!("✅ Created project #{} '{}'", project.id, project.name);
    Ok(())
}

pub async fn remove(
    store: Arc<dyn SkillStore>,
    id: ProjectId,
) -> Result<(), Box<dyn std::error::Error>> {
    match store.delete_project(id).await {
        Ok(removed) => {
            println!("🗑️  Removed project #{id} and {removed} project skill(s)");
            Ok(())
        }
        Err(StoreError::ProjectNotFound(_)) => Err(format!("Project not found: {id}").into()),
        Err(e) => Err(e.into()),
    }
}
