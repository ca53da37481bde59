//! Routing configuration grammar.
//!
//! ```text
//! config         := "server" serverBlock EOF
//! serverBlock    := "{" ( "endpoints" endpointsBlock )* "}"
//! endpointsBlock := "{" ( location ":" endpointDecl )* "}"
//! endpointDecl   := "files" filesBlock | "redirect" redirectBlock | "proxy" proxyBlock
//! filesBlock     := "{" ( "sources" ":" string )* "}"
//! redirectBlock  := "{" ( "url" ":" string )* "}"
//! proxyBlock     := "{" ( "url" ":" string )* "}"
//! ```
//!
//! Example:
//!
//! ```text
//! server {
//!     endpoints {
//!         # static site
//!         /site: files { sources: "/var/www/my site/" }
//!         /old: redirect { url: /site }
//!         /api: proxy { url: "localhost:3000/v1" }
//!     }
//! }
//! ```

use std::io::{BufRead, BufReader, Read};

use axum::http::HeaderValue;

use crate::config::proxy_url::parse_proxy_url;
use crate::lang::{Field, ParseError, Position, Reader};
use crate::routing::{
    Endpoint, EndpointFunction, FilesEndpoint, ProxyEndpoint, RedirectEndpoint, Server,
};

/// Parses a complete routing configuration.
///
/// Either the whole source is valid and a routing table is returned, or the
/// first error is returned and nothing else.
pub fn parse_server<R: Read>(source: R) -> Result<Server, ParseError> {
    let mut reader = Reader::new(BufReader::new(source));
    read_config(&mut reader)
}

fn read_config<R: BufRead>(reader: &mut Reader<R>) -> Result<Server, ParseError> {
    reader.expect_exact("server")?;
    let server = read_server(reader)?;
    reader.expect_exact("")?;
    Ok(server)
}

fn read_server<R: BufRead>(reader: &mut Reader<R>) -> Result<Server, ParseError> {
    let mut endpoints = Vec::new();
    reader.read_block(|reader, field| match field.name.as_str() {
        "endpoints" => {
            endpoints.extend(read_endpoints(reader)?);
            Ok(())
        }
        _ => Err(field.unrecognized("server property")),
    })?;
    Ok(Server::new(endpoints))
}

fn read_endpoints<R: BufRead>(reader: &mut Reader<R>) -> Result<Vec<Endpoint>, ParseError> {
    let mut endpoints = Vec::new();
    reader.read_block(|reader, field| {
        let location = field.unescaped()?;
        reader.read_separator()?;

        let kind = reader.read_name()?;
        let kind_position = reader.position();
        let function = match kind.as_str() {
            "files" => EndpointFunction::Files(read_files(reader, kind_position)?),
            "redirect" => EndpointFunction::Redirect(read_redirect(reader, kind_position)?),
            "proxy" => EndpointFunction::Proxy(read_proxy(reader, kind_position)?),
            _ => {
                return Err(Field {
                    name: kind.clone(),
                    position: kind_position,
                }
                .unrecognized("endpoint type"))
            }
        };

        endpoints.push(Endpoint::new(location, function));
        Ok(())
    })?;
    Ok(endpoints)
}

fn read_files<R: BufRead>(reader: &mut Reader<R>, at: Position) -> Result<FilesEndpoint, ParseError> {
    let mut source = None;
    reader.read_block(|reader, field| match field.name.as_str() {
        "sources" => {
            source = Some(reader.read_property()?);
            Ok(())
        }
        _ => Err(field.unrecognized("files endpoint property")),
    })?;

    let source = source.ok_or_else(|| missing(at, "files", "sources"))?;
    Ok(FilesEndpoint {
        source: source.into(),
    })
}

fn read_redirect<R: BufRead>(reader: &mut Reader<R>, at: Position) -> Result<RedirectEndpoint, ParseError> {
    let mut target = None;
    reader.read_block(|reader, field| match field.name.as_str() {
        "url" => {
            let value = reader.read_property()?;
            if HeaderValue::from_str(&value).is_err() {
                return Err(ParseError::invalid(
                    reader.position(),
                    "redirect url",
                    "contains characters not allowed in a Location header",
                ));
            }
            target = Some(value);
            Ok(())
        }
        _ => Err(field.unrecognized("redirect endpoint property")),
    })?;

    let target = target.ok_or_else(|| missing(at, "redirect", "url"))?;
    Ok(RedirectEndpoint { target })
}

fn read_proxy<R: BufRead>(reader: &mut Reader<R>, at: Position) -> Result<ProxyEndpoint, ParseError> {
    let mut endpoint = None;
    reader.read_block(|reader, field| match field.name.as_str() {
        "url" => {
            let value = reader.read_property()?;
            let parsed = parse_proxy_url(&value)
                .map_err(|e| ParseError::invalid(reader.position(), "proxy url", e.to_string()))?;
            endpoint = Some(parsed);
            Ok(())
        }
        _ => Err(field.unrecognized("proxy endpoint property")),
    })?;

    endpoint.ok_or_else(|| missing(at, "proxy", "url"))
}

fn missing(at: Position, kind: &str, property: &str) -> ParseError {
    ParseError::invalid(
        at,
        format!("{kind} endpoint"),
        format!("missing '{property}' property"),
    )
}
