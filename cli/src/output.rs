use colored::*;
use noor_core::guidance::{HadithInsightsOutput, PersonalAdviceOutput};
use noor_core::history::{Role, Turn};
use pulldown_cmark::{Event as MdEvent, HeadingLevel, Options, Parser as MdParser, Tag};
use std::io::{self, Write};

/// Print a NoorAI answer with a colored prefix
pub fn write_assistant<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    writeln!(out, "{}: {}", "NoorAI".blue().bold(), render_markdown(text).trim_end())
}

pub fn write_error<W: Write>(out: &mut W, message: &str) -> io::Result<()> {
    writeln!(out, "{}", message.red())
}

/// Print every turn of the conversation so far
pub fn write_history<W: Write>(out: &mut W, turns: &[Turn]) -> io::Result<()> {
    if turns.is_empty() {
        return writeln!(out, "{}", "No messages yet.".dimmed());
    }
    for turn in turns {
        let label = match turn.role {
            Role::User => "You".green().bold(),
            Role::Assistant => "NoorAI".blue().bold(),
        };
        writeln!(out, "{}: {}", label, turn.content)?;
    }
    Ok(())
}

pub fn print_hadith_insights(output: &HadithInsightsOutput) {
    println!("{}", "Insights".cyan().bold());
    println!("{}", render_markdown(&output.insights).trim_end());
}

pub fn print_personal_advice(output: &PersonalAdviceOutput) {
    let sections = [
        ("Advice", &output.advice),
        ("Relevant Qur'anic Verses", &output.relevant_quranic_verses),
        ("Relevant Hadith", &output.relevant_hadith),
        ("Explanation", &output.explanation),
    ];
    for (title, body) in sections {
        println!("{}", title.cyan().bold());
        println!("{}", render_markdown(body).trim_end());
        println!();
    }
}

/// Render the markdown NoorAI answers with (headings, lists, emphasis) for the terminal
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut output = String::new();
    let mut bold = false;
    let mut italic = false;

    for event in MdParser::new_ext(markdown, options) {
        match event {
            MdEvent::Start(Tag::Heading(level, ..)) => match level {
                HeadingLevel::H1 | HeadingLevel::H2 => {
                    output.push_str(&format!("\n{} ", "#".bright_cyan().bold()))
                }
                _ => output.push('\n'),
            },
            MdEvent::End(Tag::Heading(..)) => output.push('\n'),
            MdEvent::Start(Tag::Paragraph) => {
                if !output.is_empty() && !output.ends_with('\n') {
                    output.push('\n');
                }
            }
            MdEvent::End(Tag::Paragraph) => output.push_str("\n\n"),
            MdEvent::Start(Tag::Item) => output.push_str(&format!("{}  ", "•".yellow())),
            MdEvent::End(Tag::Item) => output.push('\n'),
            MdEvent::End(Tag::List(_)) => output.push('\n'),
            MdEvent::Start(Tag::Strong) => bold = true,
            MdEvent::End(Tag::Strong) => bold = false,
            MdEvent::Start(Tag::Emphasis) => italic = true,
            MdEvent::End(Tag::Emphasis) => italic = false,
            MdEvent::Text(text) | MdEvent::Code(text) => {
                let styled = match (bold, italic) {
                    (true, true) => text.bold().italic().to_string(),
                    (true, false) => text.bold().to_string(),
                    (false, true) => text.italic().to_string(),
                    (false, false) => text.to_string(),
                };
                output.push_str(&styled);
            }
            MdEvent::SoftBreak | MdEvent::HardBreak => output.push('\n'),
            _ => {}
        }
    }

    output
}
