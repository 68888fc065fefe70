use h1engine::{
    BoxError, Config, HttpError, Response, StatusCode,
    body::{BoxBody, from_fragments},
    proto::RequestContext,
    service::from_fn,
};
use tokio::{net::TcpListener, sync::watch};

mod parser;

use parser::DemoParser;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let io = TcpListener::bind("0.0.0.0:3000").await?;
    let config = Config::new()
        .server_software("h1engine-example")
        .date_header(true)
        .max_chunk_size(16 * 1024);

    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = tx.send(true);
        }
    });

    h1engine::serve(io, from_fn(handle))
        .config(config)
        .shutdown(rx)
        .run::<DemoParser>()
        .await;

    Ok(())
}

async fn handle(req: RequestContext) -> Result<Response, BoxError> {
    log::info!("> {} {} {}", req.method(), req.raw_uri(), req.server_protocol());

    match req.path() {
        "/" => Ok(Response::new(BoxBody::full("Hello World")).with_content_length(11)),
        "/stream" => {
            let lines = ["one\n", "two\n", "", "three\n"];
            Ok(Response::new(BoxBody::new(from_fragments(lines))))
        }
        "/echo" => Ok(Response::new(BoxBody::full(req.body().clone()))),
        "/old" => Err(HttpError::redirect(StatusCode::MOVED_PERMANENTLY, "/")?.into()),
        "/panic" => Err("handler failed".into()),
        _ => Err(HttpError::new(StatusCode::NOT_FOUND).into()),
    }
}
