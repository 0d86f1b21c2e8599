//! Decoding of realistic Mirakurun API payloads

use mirakurun_exporter::mirakurun::types::*;

#[test]
fn test_decode_status() {
    let json = r#"{
        "time": 1600000000000,
        "version": "3.9.0-rc.4",
        "process": {
            "arch": "arm64",
            "platform": "linux",
            "versions": {"node": "18.19.0", "v8": "10.2.154.26-node.28"},
            "env": {"PATH": "/usr/bin"},
            "pid": 42,
            "memoryUsage": {
                "rss": 100000000,
                "heapTotal": 50000000,
                "heapUsed": 40000000,
                "external": 2000000,
                "arrayBuffers": 1000000
            }
        },
        "epg": {"gatheringNetworks": [32736], "storedEvents": 12345},
        "rpcCount": 1,
        "streamCount": {"tunerDevice": 2, "tsFilter": 3, "decoder": 0},
        "errorCount": {
            "uncaughtException": 0,
            "unhandledRejection": 1,
            "bufferOverflow": 2,
            "tunerDeviceRespawn": 3,
            "decoderRespawn": 4
        },
        "timerAccuracy": {
            "last": 1.2,
            "m1": {"avg": 1.0, "min": 0.5, "max": 2.0},
            "m5": {"avg": 1.1, "min": 0.4, "max": 2.1},
            "m15": {"avg": 1.2, "min": 0.3, "max": 2.2}
        }
    }"#;

    let status: Status = serde_json::from_str(json).expect("status decodes");

    assert_eq!(status.version, "3.9.0-rc.4");
    assert_eq!(status.process.node_version(), Some("18.19.0"));
    assert_eq!(status.process.memory_usage.heap_used, 40_000_000);
    assert_eq!(status.epg.stored_events, 12345);
    assert_eq!(status.stream_count.ts_filter, 3);
    assert_eq!(status.error_count.decoder_respawn, 4);
    assert_eq!(status.timer_accuracy.m15.get(TimerStat::Max), 2.2);
}

#[test]
fn test_decode_status_with_upper_case_epg_key() {
    let status: Status =
        serde_json::from_str(r#"{"version": "3.8.0", "EPG": {"storedEvents": 7}}"#).expect("decodes");

    assert_eq!(status.epg.stored_events, 7);
    assert_eq!(status.process.node_version(), None);
}

#[test]
fn test_decode_services_with_and_without_channel() {
    let json = r#"[
        {
            "id": 3273601024,
            "serviceId": 1024,
            "networkId": 32736,
            "name": "NHK総合1・東京",
            "type": 1,
            "logoId": 0,
            "remoteControlKeyId": 1,
            "epgReady": true,
            "epgUpdatedAt": 1600000000000,
            "channel": {"type": "GR", "channel": "27"}
        },
        {"id": 1, "serviceId": 2, "name": "orphan", "type": 192}
    ]"#;

    let services: Vec<Service> = serde_json::from_str(json).expect("services decode");

    assert_eq!(services.len(), 2);
    assert_eq!(services[0].epg_updated_at, 1_600_000_000_000);
    let channel = services[0].channel.as_ref().expect("channel");
    assert_eq!(channel.channel_type, "GR");
    assert_eq!(channel.channel, "27");
    assert_eq!(services[1].channel, None);
    assert_eq!(services[1].service_type, 192);
}

#[test]
fn test_decode_jobs() {
    let json = r#"[
        {
            "key": "EPG.Gatherer.NetworkId.32736",
            "name": "EPG Gathering Network#32736",
            "id": "k1",
            "status": "finished",
            "retryCount": 0,
            "isAborting": false,
            "hasSkipped": false,
            "hasFailed": false,
            "createdAt": 1,
            "startedAt": 2,
            "finishedAt": 3,
            "duration": 35000
        },
        {"key": "k2", "status": "queued", "retryCount": 2}
    ]"#;

    let jobs: Vec<Job> = serde_json::from_str(json).expect("jobs decode");

    assert_eq!(jobs[0].status, "finished");
    assert_eq!(jobs[0].duration, 35000);
    assert_eq!(jobs[1].retry_count, 2);
    assert_eq!(jobs[1].duration, 0);
}

#[test]
fn test_decode_tuner_user_without_stream_info() {
    let json = r#"{"id": "u", "priority": -1, "agent": "mirakc"}"#;

    let user: TunerUser = serde_json::from_str(json).expect("user decodes");

    assert_eq!(user.priority, -1);
    assert!(user.stream_info.is_none());
}

#[test]
fn test_decode_channels_and_programs() {
    let channels: Vec<Channel> = serde_json::from_str(
        r#"[{"type": "BS", "channel": "BS15_0", "name": "BS1", "services": [{"id": 1, "serviceId": 101, "name": "NHK BS1"}]}]"#,
    )
    .expect("channels decode");
    let programs: Vec<Program> =
        serde_json::from_str(r#"[{"id": 1, "eventId": 2, "serviceId": 101, "startAt": 3, "duration": 4}]"#)
            .expect("programs decode");

    assert_eq!(channels[0].channel_type, "BS");
    assert_eq!(channels[0].services[0].service_id, 101);
    assert_eq!(programs[0].service_id, 101);
    assert_eq!(programs[0].name, None);
}

#[test]
fn test_timer_stat_labels() {
    let labels: Vec<_> = TimerStat::ALL.iter().map(|s| s.label()).collect();

    assert_eq!(labels, vec!["avg", "min", "max"]);
}
