//! Named coder parameters.
//!
//! The entropy coder is configured the same way NihAV encoders are: it publishes a list of
//! option definitions, options passed to it are validated against those definitions and
//! the ones it does not recognise are silently skipped.
use std::fmt;

/// Reasons an option may be rejected.
#[derive(Clone,Copy,Debug,PartialEq)]
pub enum OptionError {
    /// Option belongs to some other definition.
    WrongName,
    /// Value type does not match the definition.
    InvalidFormat,
    /// Value lies outside the allowed range.
    InvalidValue,
    /// Value could not be parsed from its text form.
    ParseError,
}

pub type OptionResult<T> = Result<T, OptionError>;

/// Kind of value an option accepts.
#[derive(Debug)]
pub enum NAOptionDefinitionType {
    /// Flag that can be switched on or off.
    Bool,
    /// Integer, optionally bounded from below and/or above (both bounds inclusive).
    Int(Option<i64>, Option<i64>),
}

#[derive(Debug,Clone,PartialEq)]
pub enum NAValue {
    Bool(bool),
    Int(i64),
}

impl fmt::Display for NAValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            NAValue::Bool(b) => write!(f, "{}", b),
            NAValue::Int(i)  => write!(f, "{}", i),
        }
    }
}

/// Option name with its value.
#[derive(Debug,Clone,PartialEq)]
pub struct NAOption {
    pub name:   &'static str,
    pub value:  NAValue,
}

/// Option description published by an option handler.
#[derive(Debug)]
pub struct NAOptionDefinition {
    pub name:           &'static str,
    /// Human-readable option meaning.
    pub description:    &'static str,
    pub opt_type:       NAOptionDefinitionType,
}

impl NAOptionDefinition {
    /// Parses command-line style arguments into an option.
    ///
    /// The name may be given with or without the leading `--`, boolean options may be
    /// negated with the `no` prefix. On success it returns the option and the number of
    /// arguments consumed.
    pub fn parse(&self, name: &str, value: Option<&str>) -> OptionResult<(NAOption, usize)> {
        let name = name.trim_start_matches("--");
        if name != self.name {
            if name.starts_with("no") && &name[2..] == self.name {
                if let NAOptionDefinitionType::Bool = self.opt_type {
                    return Ok((NAOption { name: self.name, value: NAValue::Bool(false) }, 1));
                }
                return Err(OptionError::InvalidFormat);
            }
            return Err(OptionError::WrongName);
        }
        let (value, nargs) = match self.opt_type {
                NAOptionDefinitionType::Bool => (NAValue::Bool(true), 1),
                NAOptionDefinitionType::Int(_, _) => {
                    let text = value.ok_or(OptionError::ParseError)?;
                    let ival = text.parse::<i64>().map_err(|_| OptionError::ParseError)?;
                    (NAValue::Int(ival), 2)
                },
            };
        let opt = NAOption { name: self.name, value };
        self.check(&opt)?;
        Ok((opt, nargs))
    }
    /// Validates option name, value type and range against the definition.
    pub fn check(&self, option: &NAOption) -> OptionResult<()> {
        if option.name != self.name {
            return Err(OptionError::WrongName);
        }
        match (&option.value, &self.opt_type) {
            (NAValue::Bool(_), NAOptionDefinitionType::Bool) => Ok(()),
            (&NAValue::Int(val), &NAOptionDefinitionType::Int(min, max)) => {
                let too_low  = min.map_or(false, |min| val < min);
                let too_high = max.map_or(false, |max| val > max);
                if too_low || too_high {
                    Err(OptionError::InvalidValue)
                } else {
                    Ok(())
                }
            },
            _ => Err(OptionError::InvalidFormat),
        }
    }
}

/// Common interface for objects configured with options.
pub trait NAOptionHandler {
    /// Lists the options the object understands.
    fn get_supported_options(&self) -> &[NAOptionDefinition];
    /// Applies valid options from the list, everything else is ignored.
    fn set_options(&mut self, options: &[NAOption]);
    /// Reports the current value of an option, `None` for unknown names.
    fn query_option_value(&self, name: &str) -> Option<NAValue>;
}
