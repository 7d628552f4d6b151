//! The `simulado profile` commands.

use anyhow::Result;
use comfy_table::{Cell, Table};

use simulado_core::profile::{Profile, ProfileStore};

use super::{open_store, Paths};

pub fn show(paths: &Paths) -> Result<()> {
    let config = paths.load_config()?;
    let profile = ProfileStore::open(open_store(&config)).profile();

    if !profile.is_onboarded {
        println!("Perfil ainda não configurado.");
        println!("Run: simulado onboard --name \"Seu Nome\" --course Medicina");
        return Ok(());
    }

    println!("Olá, {}!", profile.first_name());
    println!("Curso: {}", profile.target_course);
    if !profile.target_university.is_empty() {
        println!("Universidade: {}", profile.target_university);
    }
    println!("\n{}", proficiency_table(&profile));

    let weakest = profile.weakest_subject();
    println!(
        "\nRecomendação: reforce {}. Run: simulado run --subject {}",
        weakest,
        weakest.key()
    );
    Ok(())
}

pub fn reset(paths: &Paths) -> Result<()> {
    let config = paths.load_config()?;
    ProfileStore::open(open_store(&config)).reset()?;
    println!("Perfil redefinido.");
    Ok(())
}

fn proficiency_table(profile: &Profile) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Área", "Nível", "Pontuação"]);
    for (subject, level) in profile.proficiencies.iter() {
        table.add_row(vec![
            Cell::new(subject),
            Cell::new(level),
            Cell::new(level.score()),
        ]);
    }
    table
}
