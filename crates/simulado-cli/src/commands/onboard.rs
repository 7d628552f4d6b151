//! The `simulado onboard` command.

use anyhow::Result;

use simulado_core::model::{Proficiency, SubjectMap};
use simulado_core::profile::{Onboarding, ProfileStore};

use super::{open_store, Paths};

pub struct OnboardArgs {
    pub name: String,
    pub course: String,
    pub university: Option<String>,
    /// Levels not given on the command line default to medium.
    pub levels: SubjectMap<Option<Proficiency>>,
}

pub fn execute(paths: &Paths, args: OnboardArgs) -> Result<()> {
    let config = paths.load_config()?;
    let profiles = ProfileStore::open(open_store(&config));

    let form = Onboarding {
        name: args.name,
        target_course: args.course,
        target_university: args.university,
        proficiencies: SubjectMap::from_fn(|subject| args.levels[subject].unwrap_or_default()),
    };
    let profile = profiles.update(form.into_update()?)?;

    println!("Tudo pronto, {}!", profile.first_name());
    println!(
        "Objetivo: {}{}",
        profile.target_course,
        if profile.target_university.is_empty() {
            String::new()
        } else {
            format!(" ({})", profile.target_university)
        }
    );
    for (subject, level) in profile.proficiencies.iter() {
        println!("  {:<5} {}", subject.short_name(), level);
    }
    println!(
        "\nPróximo passo: simulado run --subject {}",
        profile.weakest_subject().key()
    );

    Ok(())
}
