//! 宿主已自行设置全局订阅器时不覆盖。

use viewlink_telemetry::{Error, install, installed_filter};

#[test]
fn existing_global_subscriber_is_respected() {
    tracing::subscriber::set_global_default(tracing_subscriber::registry()).unwrap();
    assert!(matches!(install(), Err(Error::SubscriberAlreadySet)));
    assert!(installed_filter().is_none());
}
