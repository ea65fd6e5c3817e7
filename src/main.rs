use std::fmt;
use std::io::{self, BufRead};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use fixed_decimal::Decimal;
use icu::locale::Locale;
use tracing_subscriber::EnvFilter;

use numaffix::plural::plural_category_from_str;
use numaffix::{
    AffixError, AffixPattern, AffixPatterns, AffixRenderer, AffixToken, BuiltinCurrencyData,
    CurrencyAffixInfo, CurrencyCode, LocalePlurals, NumberParser, ParseFlags, PluralCategorySource,
    StyledString, SymbolTable,
};

#[derive(Parser)]
#[command(name = "numaffix", version, about = "Compile, render and parse number affix patterns")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the tokens of an affix pattern
    Compile {
        pattern: String,

        /// Read the pattern in escaped syntax ('% is a percent sign)
        #[arg(long)]
        escaped: bool,
    },
    /// Render an affix pattern for a locale and currency
    Render {
        pattern: String,

        #[command(flatten)]
        locale: LocaleArgs,

        /// Render only this plural category
        #[arg(long, conflicts_with = "quantity")]
        category: Option<String>,

        /// Pick the plural variant for this number
        #[arg(long)]
        quantity: Option<String>,
    },
    /// Parse numbers with a decimal pattern such as "¤#,##0.00;(¤#,##0.00)"
    Parse {
        pattern: String,

        /// Text to parse; lines from stdin when omitted
        input: Option<String>,

        #[command(flatten)]
        locale: LocaleArgs,

        /// Require a complete prefix and suffix pair
        #[arg(long)]
        strict: bool,

        /// Accept a prefix without its suffix and vice versa
        #[arg(long)]
        unpaired: bool,

        /// Accept a plus sign where the pattern has a minus
        #[arg(long)]
        plus: bool,

        /// Match affixes exactly, without skipping ignorable characters
        #[arg(long)]
        exact: bool,
    },
}

#[derive(Args)]
struct LocaleArgs {
    #[arg(short, long, default_value = "en")]
    locale: String,

    /// ISO 4217 currency code
    #[arg(short, long)]
    currency: Option<String>,
}

enum CliError {
    Affix(AffixError),
    Usage(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Affix(e) => write!(f, "{e}"),
            CliError::Usage(msg) => f.write_str(msg),
        }
    }
}

impl From<AffixError> for CliError {
    fn from(e: AffixError) -> Self {
        CliError::Affix(e)
    }
}

impl LocaleArgs {
    fn locale(&self) -> Result<Locale, CliError> {
        self.locale
            .parse()
            .map_err(|_| CliError::Usage(format!("invalid locale: {}", self.locale)))
    }

    fn resolve(&self) -> Result<(Locale, LocalePlurals, CurrencyAffixInfo), CliError> {
        let locale = self.locale()?;
        let plurals = LocalePlurals::new(&locale).map_err(AffixError::from)?;
        let code = self.currency.as_deref().map(CurrencyCode::new).transpose()?;
        let info =
            CurrencyAffixInfo::resolve(code, &locale, &plurals.categories(), &BuiltinCurrencyData)?;
        Ok((locale, plurals, info))
    }
}

fn describe(token: AffixToken<'_>) -> String {
    match token {
        AffixToken::Literal(text) => format!("literal {text:?}"),
        AffixToken::Percent => "percent".to_string(),
        AffixToken::PerMill => "permille".to_string(),
        AffixToken::Negative => "minus".to_string(),
        AffixToken::Currency(count) => format!("currency x{count}"),
    }
}

fn print_styled(label: &str, styled: &StyledString) {
    let parts: Vec<String> = styled
        .parts()
        .map(|(field, text)| format!("{}={text:?}", field.as_str()))
        .collect();
    println!("{label}\t{:?}\t{}", styled.as_str(), parts.join(" "));
}

fn run_compile(pattern: &str, escaped: bool) -> Result<(), CliError> {
    let compiled = if escaped {
        AffixPattern::parse_escaped(pattern)?
    } else {
        AffixPattern::parse_user(pattern)?
    };
    for token in &compiled {
        println!("{}", describe(token));
    }
    println!("user syntax: {}", compiled.to_user_string());
    Ok(())
}

fn run_render(
    pattern: &str,
    locale: &LocaleArgs,
    category: Option<&str>,
    quantity: Option<&str>,
) -> Result<(), CliError> {
    let (loc, plurals, info) = locale.resolve()?;
    let compiled = AffixPattern::parse_user(pattern)?;
    let renderer = AffixRenderer::new(&SymbolTable::for_locale(&loc));

    if let Some(name) = category {
        let cat = plural_category_from_str(name)
            .ok_or_else(|| CliError::Usage(format!("unknown plural category: {name}")))?;
        print_styled(name, &renderer.render_category(&compiled, &info, cat));
        return Ok(());
    }

    let affix = renderer.render(&compiled, &info);
    if let Some(text) = quantity {
        let value: Decimal = text
            .parse()
            .map_err(|_| CliError::Usage(format!("invalid quantity: {text}")))?;
        print_styled(text, affix.select(&value, &plurals));
        return Ok(());
    }
    for cat in affix.categories() {
        print_styled(numaffix::plural::plural_category_to_str(cat), affix.get(cat));
    }
    Ok(())
}

fn parse_line(parser: &NumberParser, line: &str) -> bool {
    let result = parser.parse(line);
    if !result.success() {
        println!("{line:?}\tno match");
        return false;
    }
    let value = result
        .signed_quantity()
        .map(|d| d.to_string())
        .unwrap_or_default();
    let mut out = format!("{line:?}\t{value}\tconsumed={}", result.char_end);
    if let Some(code) = result.currency_code {
        out.push_str(&format!("\tcurrency={code}"));
    }
    println!("{out}");
    true
}

fn run_parse(
    pattern: &str,
    input: Option<&str>,
    locale: &LocaleArgs,
    flags: ParseFlags,
) -> Result<bool, CliError> {
    let (loc, _, info) = locale.resolve()?;
    let patterns = AffixPatterns::from_decimal_pattern(pattern)?;
    let parser = NumberParser::new(&patterns, &SymbolTable::for_locale(&loc), info, flags);

    if let Some(text) = input {
        return Ok(parse_line(&parser, text));
    }

    let mut all_ok = true;
    for line in io::stdin().lock().lines() {
        let line = line.map_err(|e| CliError::Usage(format!("read error: {e}")))?;
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if !trimmed.is_empty() {
            all_ok &= parse_line(&parser, trimmed);
        }
    }
    Ok(all_ok)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = match &cli.command {
        Command::Compile { pattern, escaped } => run_compile(pattern, *escaped).map(|()| true),
        Command::Render {
            pattern,
            locale,
            category,
            quantity,
        } => run_render(pattern, locale, category.as_deref(), quantity.as_deref()).map(|()| true),
        Command::Parse {
            pattern,
            input,
            locale,
            strict,
            unpaired,
            plus,
            exact,
        } => {
            let mut flags = ParseFlags::empty();
            flags.set(ParseFlags::STRICT, *strict);
            flags.set(ParseFlags::INCLUDE_UNPAIRED_AFFIXES, *unpaired);
            flags.set(ParseFlags::PLUS_SIGN_ALLOWED, *plus);
            flags.set(ParseFlags::EXACT_AFFIX, *exact);
            run_parse(pattern, input.as_deref(), locale, flags)
        }
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(2)
        }
    }
}
