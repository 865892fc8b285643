use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{get_config_path, save_config, ApiConfig, Config, DEFAULT_TIMEOUT};
use crate::scoring::{AbsentMarkPolicy, GradingScale, RankKey, ScoringPolicy, TieBreak};

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout().flush().context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

fn prompt_choice<T: Copy>(message: &str, choices: &[(&str, T)]) -> Result<T> {
    let names: Vec<&str> = choices.iter().map(|(name, _)| *name).collect();
    loop {
        let input = prompt_with_default(&format!("{} ({})", message, names.join("/")), names[0])?;
        if let Some((_, value)) = choices.iter().find(|(name, _)| name.eq_ignore_ascii_case(&input)) {
            return Ok(*value);
        }
        println!("  Invalid: choose one of {}. Try again.", names.join(", "));
    }
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    println!("Exam Results Configuration");
    println!("==========================");
    println!();

    // 1. API
    println!("Results are fetched from your school's API. Enter its root URL.");
    let base_url = loop {
        let input = prompt_with_default("API base URL", "http://localhost:8000/api")?;
        if input.starts_with("http://") || input.starts_with("https://") {
            break input;
        }
        println!("  Invalid: must start with http:// or https://. Try again.");
    };
    let timeout = loop {
        let input = prompt_with_default("Request timeout", DEFAULT_TIMEOUT)?;
        let api = ApiConfig {
            base_url: base_url.clone(),
            timeout: Some(input.clone()),
        };
        match api.timeout_duration() {
            Ok(_) => break input,
            Err(e) => println!("  Invalid: {}. Try again.", e),
        }
    };

    // 2. Scoring policy
    println!();
    let configure_scoring = prompt_yes_no("Configure scoring policy? (n accepts defaults)", false)?;
    let scoring = if configure_scoring {
        println!();
        println!("A subject with no entered mark can fail the student, or be left out of the totals.");
        let absent_marks = prompt_choice(
            "Subjects without a mark",
            &[
                ("fail", AbsentMarkPolicy::Fail),
                ("exclude", AbsentMarkPolicy::Exclude),
            ],
        )?;
        let rank_by = prompt_choice(
            "Rank class reports by",
            &[
                ("percentage", RankKey::Percentage),
                ("total_marks", RankKey::TotalMarks),
            ],
        )?;
        println!("Shared ties rank 95, 80, 80, 60 as 1, 2, 2, 4. Sequential ranks them 1, 2, 3, 4.");
        let ties = prompt_choice(
            "Tie ranking",
            &[("shared", TieBreak::Shared), ("sequential", TieBreak::Sequential)],
        )?;
        Some(ScoringPolicy {
            absent_marks,
            rank_by,
            ties,
        })
    } else {
        None
    };

    // 3. Grading bands
    println!();
    println!("Grade bands map percentages to grades for each exam type.");
    let write_bands = prompt_yes_no(
        "Write the built-in grade bands into the config so you can edit them?",
        false,
    )?;
    let grading = write_bands.then(GradingScale::default);

    // 4. Config path
    let default_config_path = default_path.unwrap_or_else(get_config_path);
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    // 5. Write config
    let config = Config {
        api: ApiConfig {
            base_url,
            timeout: (timeout != DEFAULT_TIMEOUT).then_some(timeout),
        },
        scoring,
        grading,
    };
    save_config(&config_path, &config)?;

    println!();
    println!("Config written to {}", config_path.display());
    println!("Run `exam-results exams` to list published exams.");

    Ok(())
}
