use nom::{
    error::{ErrorKind, ParseError, VerboseError, VerboseErrorKind},
    Offset,
};

pub type Input<'a> = &'a [u8];
pub type Result<'a, O> = nom::IResult<Input<'a>, O, nom::error::VerboseError<Input<'a>>>;

/// Implements a `parse` function for an input enum, that allows it to be
/// parsed in terms of a numeric type.
///
/// Shamelessly borrowed from fasterthanlime's executable packer tutorial:
/// https://fasterthanli.me/series/making-our-own-executable-packer
#[macro_export]
macro_rules! impl_parse_for_enum {
    ($type: ident, $number_parser: ident) => {
        impl $type {
            pub fn parse(i: crate::parse::Input) -> crate::parse::Result<Self> {
                use nom::{
                    combinator::map_res,
                    error::{context, ErrorKind},
                    number::complete::$number_parser,
                };
                use std::convert::TryFrom;

                let parser = map_res($number_parser, |x| {
                    Self::try_from(x).map_err(|_| ErrorKind::Alt)
                });
                context(stringify!($type), parser)(i)
            }
        }
    };
}

/// Return the slice of `original` that starts at `offset`. Offsets read out of a TIFF structure
/// come straight from the file, so an offset past the end of the data is reported as a parse
/// error instead of being used to index into the slice.
pub fn slice_from(
    original: Input,
    offset: usize,
) -> std::result::Result<Input, nom::Err<VerboseError<Input>>> {
    match original.get(offset..) {
        Some(rest) => Ok(rest),
        None => Err(nom::Err::Failure(VerboseError::from_error_kind(
            original,
            ErrorKind::Eof,
        ))),
    }
}

/// Turn a parser error into a single line that walks from the outermost context down to the
/// innermost failure, annotated with the byte offset at which each step failed.
pub fn pretty_error_message(input: Input, e: nom::Err<VerboseError<Input>>) -> String {
    let e = match e {
        nom::Err::Error(e) | nom::Err::Failure(e) => e,
        nom::Err::Incomplete(_) => return "Unexpected end of input".to_string(),
    };

    e.errors
        .iter()
        .map(|(at, kind)| {
            let what = match kind {
                VerboseErrorKind::Context(ctx) => ctx.to_string(),
                VerboseErrorKind::Char(c) => format!("expected '{}'", c),
                VerboseErrorKind::Nom(kind) => format!("{:?}", kind),
            };
            format!("{} (offset 0x{:x})", what, input.offset(at))
        })
        .rev()
        .fold("JPEGFile::parse".to_string(), |acc, x| {
            format!("{} => {}", acc, x)
        })
}
