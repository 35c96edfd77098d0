use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::{Display, Formatter};

pub use args::{ArgDef, ArgKind};

pub mod args;

const HELP_NAME: &str = "help";
const HELP_ALIAS: char = 'h';
const HELP_DESCRIPTION: &str = "Print this help";
const OPT_NAME: &str = "name";
const ALIAS: &str = "alias";
const DESCRIPTION: &str = "description";
const REQ: &str = "req";
const FLAGS: &str = "Flags (with no value required):";
const VALUE_OPTION: &str = "Options (expect a value as next argument):";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgLiteErr {
    AmbigousName(String),
    AmbigousAlias(char),
    MandatoryArgIsntProvided(Vec<String>),
    UnknownOption(String),
    UnknownAlias(char),
    ExpectedValueButGotNothing(String),
    ValuesAreForbiddenWithMultiAliasSyntax(char),
    HelpIsReserved,
}

impl Display for ArgLiteErr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ArgLiteErr::AmbigousName(name) => write!(f, "option '--{name}' is defined twice"),
            ArgLiteErr::AmbigousAlias(alias) => write!(f, "alias '-{alias}' is defined twice"),
            ArgLiteErr::MandatoryArgIsntProvided(names) => {
                write!(f, "missing mandatory option(s): {}", names.join(", "))
            }
            ArgLiteErr::UnknownOption(name) => write!(f, "unknown option '--{name}'"),
            ArgLiteErr::UnknownAlias(alias) => write!(f, "unknown option '-{alias}'"),
            ArgLiteErr::ExpectedValueButGotNothing(name) => {
                write!(f, "option '--{name}' expects a value")
            }
            ArgLiteErr::ValuesAreForbiddenWithMultiAliasSyntax(alias) => {
                write!(f, "'-{alias}' expects a value and can't be grouped with other aliases")
            }
            ArgLiteErr::HelpIsReserved => write!(f, "'--help' and '-h' are reserved"),
        }
    }
}

impl std::error::Error for ArgLiteErr {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    /// `--help` or `-h` was given, holds the generated help text.
    Help(String),
    Args(ParsedArgs),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedArgs {
    values: HashMap<String, String>,
    flags: HashSet<String>,
    positionals: Vec<String>,
}

impl ParsedArgs {
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn is_present(&self, name: &str) -> bool {
        self.flags.contains(name)
    }

    /// Everything from the first argument that isn't an option on.
    pub fn positionals(&self) -> &[String] {
        &self.positionals
    }
}

pub struct ArgLite {
    usage: Option<String>,
    defs: Vec<ArgDef>,
    names: BTreeMap<String, usize>,
    aliases: HashMap<char, usize>,
}

impl ArgLite {
    pub fn new(usage: Option<&str>) -> Self {
        Self {
            usage: usage.map(str::to_string),
            defs: Vec::new(),
            names: BTreeMap::new(),
            aliases: HashMap::new(),
        }
    }

    pub fn arg(mut self, def: ArgDef) -> Result<Self, ArgLiteErr> {
        if def.name == HELP_NAME || def.alias == HELP_ALIAS {
            Err(ArgLiteErr::HelpIsReserved)?;
        }
        if self.names.contains_key(&def.name) {
            Err(ArgLiteErr::AmbigousName(def.name.clone()))?;
        }
        if self.aliases.contains_key(&def.alias) {
            Err(ArgLiteErr::AmbigousAlias(def.alias))?;
        }

        let idx = self.defs.len();
        self.names.insert(def.name.clone(), idx);
        self.aliases.insert(def.alias, idx);
        self.defs.push(def);
        Ok(self)
    }

    fn help_line(
        name: &str,
        alias: &str,
        req: Option<&str>,
        description: &str,
        width: usize,
    ) -> String {
        format!(
            "{name:<width$}\t{alias}\t{}{description}",
            req.map(|v| format!("{v}\t")).unwrap_or_default()
        )
    }

    pub fn help(&self) -> String {
        let mut res = Vec::with_capacity(self.defs.len() + 8);

        if let Some(usage) = &self.usage {
            res.push(usage.clone());
            res.push(String::new());
        }

        // sorted by name
        let (flags, options): (Vec<&ArgDef>, Vec<&ArgDef>) = self
            .names
            .values()
            .map(|&idx| &self.defs[idx])
            .partition(|def| def.is_flag());

        let width = flags
            .iter()
            .map(|def| def.name.len())
            .chain([OPT_NAME.len(), HELP_NAME.len()])
            .max()
            .unwrap_or_default();
        res.push(FLAGS.to_string());
        res.push(Self::help_line(OPT_NAME, ALIAS, None, DESCRIPTION, width));
        res.push(Self::help_line(
            HELP_NAME,
            &HELP_ALIAS.to_string(),
            None,
            HELP_DESCRIPTION,
            width,
        ));
        for def in flags {
            res.push(Self::help_line(
                &def.name,
                &def.alias.to_string(),
                None,
                &def.description,
                width,
            ));
        }

        if !options.is_empty() {
            let width = options
                .iter()
                .map(|def| def.name.len())
                .chain([OPT_NAME.len()])
                .max()
                .unwrap_or_default();
            res.push(String::new());
            res.push(VALUE_OPTION.to_string());
            res.push(Self::help_line(OPT_NAME, ALIAS, Some(REQ), DESCRIPTION, width));
            for def in options {
                res.push(Self::help_line(
                    &def.name,
                    &def.alias.to_string(),
                    Some(&def.is_mandatory().to_string()),
                    &def.description,
                    width,
                ));
            }
        }

        res.join("\n")
    }

    fn take<I>(
        &self,
        idx: usize,
        source: &mut I,
        parsed: &mut ParsedArgs,
    ) -> Result<(), ArgLiteErr>
    where
        I: Iterator<Item = String>,
    {
        let def = &self.defs[idx];
        match def.kind {
            ArgKind::Flag => {
                parsed.flags.insert(def.name.clone());
            }
            ArgKind::Value { .. } => {
                let value = source
                    .next()
                    .ok_or_else(|| ArgLiteErr::ExpectedValueButGotNothing(def.name.clone()))?;
                parsed.values.insert(def.name.clone(), value);
            }
        }
        Ok(())
    }

    fn assert_all_provided(&self, parsed: &ParsedArgs) -> Result<(), ArgLiteErr> {
        let missing = self
            .defs
            .iter()
            .filter(|def| def.is_mandatory() && parsed.value(&def.name).is_none())
            .map(|def| def.name.clone())
            .collect::<Vec<_>>();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ArgLiteErr::MandatoryArgIsntProvided(missing))
        }
    }

    /// Options are read until the first positional argument, which together
    /// with everything after it is returned as-is.
    pub fn parse<I>(&self, source: I) -> Result<Parsed, ArgLiteErr>
    where
        I: IntoIterator<Item = String>,
    {
        let mut source = source.into_iter();
        let mut parsed = ParsedArgs::default();

        while let Some(cur) = source.next() {
            if cur == format!("--{HELP_NAME}") || cur == format!("-{HELP_ALIAS}") {
                return Ok(Parsed::Help(self.help()));
            }
            if let Some(arg_name) = cur.strip_prefix("--") {
                let def_idx = self
                    .names
                    .get(arg_name)
                    .copied()
                    .ok_or_else(|| ArgLiteErr::UnknownOption(arg_name.to_string()))?;
                self.take(def_idx, &mut source, &mut parsed)?;
            } else if let Some(arg_aliases) = cur.strip_prefix('-').filter(|a| !a.is_empty()) {
                let has_one_alias = arg_aliases.chars().count() == 1;
                for alias in arg_aliases.chars() {
                    let def_idx = self
                        .aliases
                        .get(&alias)
                        .copied()
                        .ok_or(ArgLiteErr::UnknownAlias(alias))?;
                    if !has_one_alias && !self.defs[def_idx].is_flag() {
                        Err(ArgLiteErr::ValuesAreForbiddenWithMultiAliasSyntax(alias))?;
                    }
                    self.take(def_idx, &mut source, &mut parsed)?;
                }
            } else {
                parsed.positionals.push(cur);
                parsed.positionals.extend(source.by_ref());
            }
        }

        self.assert_all_provided(&parsed)?;
        Ok(Parsed::Args(parsed))
    }

    pub fn parse_env(&self) -> Result<Parsed, ArgLiteErr> {
        self.parse(std::env::args().skip(1))
    }
}
