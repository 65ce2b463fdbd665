//! Initialize a new SlideReel project.

use std::path::PathBuf;

use slidereel_project_model::project::LoadedProject;

pub fn run(name: String, output: PathBuf, no_date: bool) -> anyhow::Result<()> {
    let dir_name = project_dir_name(&name, no_date);
    println!(
        "Creating project '{}' in workspace {}",
        dir_name,
        output.display()
    );

    let paths = LoadedProject::create(&output, &dir_name)
        .map_err(|e| anyhow::anyhow!("Failed to create project: {e}"))?;

    println!("Project created successfully:");
    println!("  Directory: {}", paths.root.display());
    println!();
    println!("Directory structure:");
    println!("  config.json      (names the active project)");
    println!("  {dir_name}/");
    println!("  ├── slides.json  (slide list)");
    println!("  ├── IMGS/        (slide images)");
    println!("  ├── VOICE/       (narration audio)");
    println!("  └── SUBS/        (caption overlays, sub_0001.png ...)");

    Ok(())
}

fn project_dir_name(name: &str, no_date: bool) -> String {
    if no_date {
        format!("video_{name}")
    } else {
        let today = chrono::Local::now().format("%Y-%m-%d");
        format!("video_{name}_{today}")
    }
}
