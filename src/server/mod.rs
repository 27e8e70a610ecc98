use crate::conf::Conf;
use crate::invoice;
use crate::{error, Result};
use actix_web::dev::Service;
use actix_web::web::scope;
use actix_web::web::Data;
use actix_web::web::JsonConfig;
use actix_web::{
    middleware::{Compress, NormalizePath},
    App, HttpServer,
};
use futures_util::future::FutureExt;
use time::OffsetDateTime;
use tracing::info;

pub async fn run() -> Result<()> {
    let conf = Conf::from_env()?;
    let bind_addr = conf.http_bind_addr.clone();
    info!(addr = bind_addr.as_str(), "Starting HTTP server");
    HttpServer::new(move || {
        App::new()
            .wrap_fn(|req, srv| {
                let req_query_string = req.query_string().to_string();
                let req_method = req.method().as_str().to_string();
                let req_path = req.path().to_string();
                let req_time = OffsetDateTime::now_utc();
                srv.call(req).map(move |res| {
                    if let Ok(res) = res.as_ref() {
                        let res_status = res.status().as_u16();
                        info!(
                            req_query_string,
                            req_method,
                            req_path,
                            res_status,
                            res_time_sec = (OffsetDateTime::now_utc() - req_time).as_seconds_f64(),
                        );
                    }
                    res
                })
            })
            .wrap(NormalizePath::trim())
            .wrap(Compress::default())
            .app_data(Data::new(conf.clone()))
            .app_data(JsonConfig::default().error_handler(error::json_error_handler))
            .service(
                scope("v1").service(
                    scope("invoices")
                        .service(invoice::v1::get_form)
                        .service(invoice::v1::post_search),
                ),
            )
    })
    .bind(bind_addr.as_str())?
    .run()
    .await?;

    Ok(())
}
