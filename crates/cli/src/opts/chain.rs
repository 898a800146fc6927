use alloy_chains::Chain;
use clap::builder::TypedValueParser;

/// The value parser for `Chain`s, accepting a chain name or an EIP-155 id.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChainValueParser;

impl TypedValueParser for ChainValueParser {
    type Value = Chain;

    fn parse_ref(
        &self,
        _cmd: &clap::Command,
        _arg: Option<&clap::Arg>,
        value: &std::ffi::OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let value = value.to_str().ok_or_else(|| {
            clap::Error::raw(clap::error::ErrorKind::InvalidUtf8, "chain argument is not UTF-8")
        })?;
        value.parse::<Chain>().map_err(|_| {
            clap::Error::raw(
                clap::error::ErrorKind::InvalidValue,
                format!("`{value}` is not a known chain name or EIP-155 chain ID\n"),
            )
        })
    }
}
