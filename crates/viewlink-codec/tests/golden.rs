//! 历史令牌回归：这些字符串曾被真实分享，任何模式变更都必须保持它们可解码且语义不变。

use chrono::{DateTime, Utc};
use viewlink_codec::{DecodeError, StateCodec, lz};
use viewlink_core::{
    BooleanClause, Bounds, Bucket, DateRange, Direction, Duration, Essence, Filter, FilterClause,
    FixedTimeClause, Legend, NumberClause, NumberRange, RelativeTimeClause, SeriesPeriod, Series,
    Sort, SortKind, Split, SplitKind, StringAction, StringClause, TimePeriod, Visualization,
};

const TABLE_V2: &str = concat!(
    "table/2/EQUQLgxg9AqgKgYWAGgN7APYAdgC5gCGAdgCYqZYCmATsWbutnoaedjXXozvp8hR1YMKzPgNpDuo1v3YT6U/BgBuNADYEcsqvK4j81SgDNyRAgFtKzMA",
    "EtLwAL79KADyyGAzh5sYiepvhqNmAcauTKBGoArlbCHmAE1GDMAEwADACMAKwAtGkAnDkZKXBpabhlFWkAdGVpAFrklELA6dl5hRkAzKXllWW1ZY1OwGAAnlTMcACSALI",
    "gAPoASgCCAHIA4iCOI67ulF4+fsIBmKrUGlrinCc8wIYm/Gb2+BAAFsRElGG7bp7evn8dyCIVoYX4EWisXQHkoYDgE1iwAAynAltNNk01JRLEQwB48ABtYDNYAAXRG40m",
    "+GRIDgO1++0OgNuzCIGGS2kECn0Z3UmjYOhuinuxlMFiRNg8SwwACMOY5nH8DgDjiKQaFwpEYnpYfDEcwAEIAeWNABkQOssTjmviiWBqDEKfwqUjafSHJ7Gf8jkDmBBfA",
    "kbEQCVzdKyDGKnhLmFgCABzKzelW+iPADVgrVQ5gAKRoOLGiuAAfMccMbIw1HMkR2SqZqr9+GrkDegu5jdFj2AzyRUVh1AQH2oBJGhkTbmYAD0VgASWsk5XMtW8lT8q5y",
    "YW8h7il7FjDmXFgM3NeNgVvJpcdjM1iHa6HAPUI6nANYwWaGkBLZbrLbWw8E3BCRhBIkjwLpnCEIgojUNQHGdUYDRpOkGWQICF3rVMRW3aNd3eT5viLDxKzAFYIFsFkRS",
    "I0C6x9CityjbsY3wEhvgSIsSBsQwyNTYAWI8CBmg4oh4yLIJzGCUjyOXU4xOCLMdVwLI0k9NB0No6S7mwxjdylGV5WSEYqJI7i6NOIymkXBs0y0ntmBYtQ2JGDiuKkuyD",
    "gE0hgxEkZZOM1y018+TYiyFT0D2dSOxspi9wPW1j2Es8i1lKIIAAazhSTMN5KDzFlGhDRS9LOQfGwAC9YgyZT+CMzLTLucyaJTOrmCi3d7Mc/hnMoEzjl49zBK80S7Akn",
    "qr2G4rIQUkKnDCyystOVqkVsewRmStKMtGtNlsoAr1uKkgolofzgAABTgDIAAlCOI2qNOYBq1Kau7Iy7WzmNYgh2M47rjr4jyhO8/hfNusbxImu88CgmDPTJZAHRiTqPp",
    "QYl2s+/gAyiPFyAIEgWLIWHiTwogvnBbSDjjATyF0uUFVhvqHLRqG1GQJmWegtQgA===",
);

const TABLE_V3: &str = concat!(
    "3/N4IgbglgzgrghgGwgLzgFwgewHYgFwhpwBGCApiADSEQC2ZyOFBAomgMYD0AqgCoDCVEADMICNGQBOUfAG1QaAJ4AHZjXpDJZYfnUVqGegCU42AOZkZeeSChFJ",
    "aXQCYADAEYArAFoXATi9uTrwuLnghYS4AdCEuAFpCZNgAJs7u3n4BAMzBoeEh0SHxAL4AukWUCipqdpIQ5prauuwAFqbYZAhCcOwYOLp1QmCIMJZyIIkgJdTYmI54wohQ",
    "ZOWVqrrEmJjkpg06BNBGmBuO1EMII1ayaJIjUyAzc9cjK4RVujV1Zru6ynAWXT0sLgCOwcEQ6jJTsNRtYQAApKRkWiKSbTWb4BYIJYvJRrAgferULR7EAwJaSfitaQA3r",
    "AkC0dAtQbQy4gAB6AEEACSo+7o+aLZYVV54+4wWjEKTfEGYWj0bBoAAyiTMaGaQgeGMFRNMFkuoDscAc+Ey1ESKTw2BgCAQ1A2MGSVhAsgAlCBSqVqFBlEg0PqRdVrp8h",
    "Ek6IkoECmq1sO1Ol7MMa8KBibokh0iCGIFpAX0CGmoOxzcHyiAkLQIHMPC4cW98UHCSBQ/KI7mQAcjuj44nk408+m4Jns7TU5ZC8li9QyxX8B4a6KrRKpdQm+HIzK5Ykl",
    "Sq1UIzJJTNajRWUXg3C4u3MeyS0+IB8us2Qc3T82PQ/US1PK3O1IZ9I2w9gLZ0r+u77laCBHkougAAq8G4AASQhQAml4gCmfa3oOj7Dn2BZFu+k50NOlrWggnr0mQcCwF",
    "oVigNAACy1oYPgTxkF6nzkCOmHULQTEQGMN4ZtQoIOicIBwEkaYpGU1DKHU7RJAAIgBQGsi0bQdBqcD0N63R/u2xy8nJMZkEkADKKFcUJpZkBYyT4OBtogM0EBmM0SBuX",
    "MjlFEAA=",
);

const TABLE_V4: &str = concat!(
    "4/N4IgbglgzgrghgGwgLzgFwgewHYgFwhpwBGCApiADSEQC2ZyOFBAomgMYD0AqgCoDCVEADMICNGQBOUfAG1QaAJ4AHZjXpDJZYfnUVqGegCU42AOZkZeeSChFJ",
    "aXQCYADAEYArAFoXATi9uTrwuLnghYS4AdCEuAFpCZNgAJs7u3n4BAMzBoeEh0SHxAL4AukWUCipqdpIQ5prauuwAFqbYZAhCcOwYOLp1QmCIMJZyIIkgJdTYmI54wohQ",
    "ZOWVqrrEmJjkpg06BNBGmBuO1EMII1ayaJIjUyAzc9cjK4RVujV1Zru6ynAWXT0sLgCOwcEQ6jJTsNRtYQAApKRkWiKSbTWb4BYIJYvJRrAgferULR7EAwJaSfitaQA3r",
    "AkC0dAtQbQy4gAB6AEEACSo+7o+aLZYVV54+4wWjEKTfEGYWj0bBoAAyiTMaGaQgeGMFRNMFkuoDscAc+Ey1ESKTw2BgCAQ1A2MGSVhAsgAlCBSqVqFBlEg0PqRdVrp8h",
    "Ek6IkoECmq1sO1Ol7MMa8KBibokh0iEJcdUpBBRtRQ1pAX0CGmoOxzcHqKpapgLSB3dQkLQIHMPC4cW98UHCSBQ/KI8WQAcjuj44nk40S+m4JnO7Yc3nexBC7TU5Zy8lK",
    "yBq1g6w2QE2W/gPB3RVaJVL82HsAO6aC5YklSq1UIzJJTNajS2UXg3C4x3ME4kmm4gzgYc7krmkJLiukZTmWFY9juta6Puh6tqeaiGPoS79nBeivu+VoIF+Si6AACrwbg",
    "ABJCFACaASAKZTqBs6ipBi4FmQRZ0qWG6hkhOYoQQaF0EelrWggnrzrUMI2MSiLYOWa6sdQwgJgyjFZmuCzWic4DQqh5QBro9BwLAWgNkBinKTKDr6epkiafgqxqGmuni",
    "My5xqPu2kEGZFkUC8ClaEpahwEkaYpGpGnoC5JlTh5+lnCMRngaKAUwJZ0nKHU7RJAAItet6si0bQdBqcD0N63Q4cOxy8rlMZkEkADKDEqRmjZkBYyT4MRUlAA==",
);

const LINE_CHART_V2: &str = concat!(
    "line-chart/2/EQUQLgxg9AqgKgYWAGgN7APYAdgC5gCGAdgCYqZYCmATsWbutnpgG40A2BOyFNdejHPmqUAZuSIEAtpWZgAljOABfHpQAeWEQGdt8jEQEU5iygC",
    "ViAc1k9sfUkabCxE6bPxSVPEgFdaCg2YABQBGABFybTBKIQBaEOVVYA0tSl19QwZjfAw2ak5uXloHLKdgEXEeSSV8CAALYiJKdi9kzR09QNKhYHZ5aNoWnhYCdh93dG1K",
    "MDgATypmAGU4MwBJADkAcXJmyhkiMG08AG1kwyqMSJZyEhtgUWpyCCOAXSSwefdgRZA4FUTkMd0CkOhlHD0Kq4asB6o1mq1tBhqGAAIIQAKZQTMRHInbtNKdTHZcouKpu",
    "Zi3dhgAitEjyETosH4W7aCCUUjyIiWVp9KT9NEY8HMXn9cgjMbuACsAAYAcD8ekuljnJVgNUvgolEkAEY+CAAa2mAqZyuAmsoACE9YawDc/ARBfggnAQgAJBFI1GMpXEn",
    "G2tQKwlClVQjWmWn0yjezKEVnsulc/4vZBgajjbzNakoU6UrM8CAYHwHcgEEi3MjJ06wohNIZqtzaLAENnkeTaMwYbUYW3J4C5mloPumIhB2oNGvw4ajcZHLLS5hES48E",
    "LY648ADMzAe5AALMxnuRJcx2f9kEQfOx2IOMAB3JqPfB9JqxWG4jNUmndZi5Dhcch2Yp6FNSEyWhc1WhBAkTWJPoBlGMVpwmYAogIXF8AAJmlEJJViaUAE54nQl1pVwaU",
    "SLIgA6MjpQALR2EpgEw7DcIIkIiJCEJSPI6UqLIuj3k+Zg4FWABZEAAH0zBRLYQFPYAZAIbQ/C+Asi1tZQgA",
);

const LINE_CHART_V3: &str = concat!(
    "3/N4IgbglgzgrghgGwgLzgFwgewHYgFwhLYCmAtAMYAWcATmiADQgYC2xyOx+IAomuQHoAqgBUAwoxAAzCAjTEaUfAG1QaAJ4AHLgVZcmNYlO57JegAoKsAEyV5V",
    "IazBrosuAuYCMAEUlR5mviknkwa2twI6MT+IAC+ALqxDGpaOiD+NBDYAOaShsYEVHDYJAiScOQYONxZkmCIMNEqIMS4TNiYfmCS1vrSNJLkSvHtmPR4UohQxAlMUJpIaH",
    "YOYWkZWblM1hBs2FBu3EUlxGVzmHT4oPncvXJwPRCGlQcEvVDkrds5cUxILBDjACsAAYkilwrodn1trt9tVIWxJNkXNgYJFMhpuOYRJ4ABJ+c7jK5GExQh5PKruEBwd6f",
    "DY/Qg7AH4VEIBCzEBsGnOJp4UDQACyaIw+DQNEacw2CDStzQ9yYLGFEGasvlIHImBg2HoTDg1l61hAiSYmiyJGs3ihezcy3V1GOpxA2DgbHmFT60AASpgAEZjI0ms3Eaw",
    "AZUJNxOcsk0uyn0ujitcKpR1K0aZ41ZCCY9QQjTsoGB3A6kk83Cg3SYAGZuFIBkwACyHJRMQHcVoM6hQAByaLKEymMyYlAg2UoSFHRJAmAA7iQBgQiGQihcmDI5ApluC0",
    "qYDCSEX09J7irHN+k5RcCAAmYGeQGkYEATmCl5xwLwwLfH4AdB/gQAtSQ4yvG870fZ8cU8d9P2BH8PwAhIOS5WBDEOTVtTiWIgA===",
);

const LINE_CHART_V4: &str = concat!(
    "4/N4IgbglgzgrghgGwgLzgFwgewHYgFwhLYCmAtAMYAWcATmiADQgYC2xyOx+IAomuQHoAqgBUAwoxAAzCAjTEaUfAG1QaAJ4AHLgVZcmNYlO57JegAoKsAEyV5V",
    "IazBrosuAuYCMAEUlR5mviknkwa2twI6MT+IAC+ALqxDGpaOiD+NBDYAOaShsYEVHDYJAiScOQYONxZkmCIMNEqIMS4TNiYfmCS1vrSNJLkSvHtmPR4UohQxAlMUJpIaH",
    "YOYWkZWblM1hBs2FBu3EUlxGVzmHT4oPncvXJwZqnc05lNWxCGlQcEvVDkrds5STaTKYazcOJMJAsCDjACsAAYkilwrodn1trt9tVUWxJNkXNgYJFMhpuOYRJ4ABJ+c7j",
    "K5GExoh4oxxovYHN4fKruEBwX7/DYQwg7GH4QkIBCzdJWJr2elSBStP43E5oe5MKTnFjoS7MR7fIxwIn0Jj1BCNcFJPUsth85xcJEgfKK7DKwqYGDYE3SLU6vDItK9SbG",
    "uoNNJC1bcW2wQwQ+Uut286y9MEa31062Bw0h01hy2hfUgaP2uIjECaLIkazeNlYvbNI6lSTYOBseYVPrQABKmAARmMQGWK8drABlWkqu6SBDEbL/XUY1p1w7UY6nYXQ8b",
    "ihC582y0Dw7gdSSeJ7dJgAZm4UgGTAALIclExYdxWkLqFAAHJEsoTKYzWIgA==",
);

const NO_SLASH_V2: &str = concat!(
    "line-chart/2/EQUQLgxg9AqgKgYWAGgN7APYAdgC5MBuApgE4A2AhjsplqRQHYAme62ewJRAZisAxQC2RDmACWw4AF8aRAB5YuAZyViMDVrVESiA",
    "JUYBzETWz1mm9vi68aAyfkHSaTAK4kK49RwAKARgAifEpgRDi4ALS+UjIA2ujyikQqahq4bGGcPHx2IvjikjLAAEYuEADWRGAAghCeqenawgBCpRVgfK7u",
    "dT5wvgASTsBKGCTVtSkWGcOjfAnKql5pWlZZtkK5wPkihUxiXOOLwBRKEETMYgwG0lIAushgJC5EzkRkYBQoMcAQGC4M7XcvhAABaMBivbLrJRYCinPhiJ",
    "S6DBFDAAl5vD7IBguMhkLE4vHY3FAA==",
);

const NO_SLASH_V3: &str = concat!(
    "3/N4IgbglgzgrghgGwgLzgFwgewHYgFwhLYCmAtAMYAWcATmiADQgYC2xyOx+IAomuQHoAqgBUAwoxAAzCAjTEaUfAG1QaAJ4AHLgVZcmNYlO57Je",
    "gAoKsAEyV5VIazBrosuAuYCMAETNadhOjEUPRMIcSa+KSeAL4AuvFhmkhodg4a2iYQbJLW2cTYUG5ZOUwA5i7YMAi0EBrc5iKeABKSUJh0+KCGxrr5uRCG",
    "5Bg43HBQ5AV52GUgMUxILHX4VQgIiSBs487BXSDQALLVGPhoNDDEYRAzCAHWxHJwkizHECog5Jgw2PQJTJrXEjWbz5QpuNIfajYEgISTYOBsKCaOCTSTQA",
    "BKmAARphfv9AcRrABlDr0Aj3R6SW5lKYraoIJiUCBlShIFlk1brIA",
);

/// 第 2 版表格令牌去掉第 2 版独有字段后的隐式第 1 版形态。
const TABLE_V1: &str = concat!(
    "table/NoIgogLgxg9AqgFQMIgDQG8QHsAOIBcIAhgHYAma2OApgE6kX6a4HHmW50MHN6HeoqXdkyqsBQ+iN7j2gzlMYzCWAG50ANkTzyainmMK1qAM0okiAW2qsIAS2",
    "sgAvoOoAPHMYDOXu1hIGLIQadhBcGpSqRBoArjaiXhBEtBCsAEwADACMAKwAtBkAnHlZaQgZGfgVVRkAdBUZAFqU1CIgmbkFxVkAzOWV1RX1Fc0uIBAAnjSsCACS",
    "ALJgAPoASgCCAHIA4mDOY+6e1D5+AaJB2Oq0WjqS3Gd8IMZmghaOhFAAFqQk1BH7Ht5fP5Ag8QmF6BFBFFYvFMF5qBAEFN4iAAMoIFazbYtDTUawkCBeAigVogAC",
    "6Y0m00IqLACD2/0Ox2B91YJCwqV0wiUhgumm0HD0d2Uj1M5isKLsXhWWAARhznK4AUcgacRWDwpFonEDPDEcjWAAhADyxoAMmBNji8a1CcSILQ4hTBFSUbT6U5PY",
    "zAScQawoP4knYSESufpWUYxS8JawcEQAOY2b0q30RkAaiFamGsABSdDxE0VIADljjxjZWFolmieyVTNVfsI1egH0F3MboueIFeKJi8NoSC+tCJY2MiY8rAAemsAC",
    "S1kAHH0skVqfk3BTC3lPcVvYtYSz4iBm1rxiCt5PMtW8jM1qHa2EgPVI6kgDZweaGsArVabHbWw9EvgwBwkkKQED0rgiCQMQaBoTjOuMBo0nSDKoMBC7KpeHbbtG",
    "u6fN8vxFl4lYQGsUD2MuvLEWBdZLle5w4d2MaEGQvxJEWZB2MY5GpiArFeFArScSQ8ZFiElihGRFH0aCDihFmOr4DkGSehgGH1qmIqMT2rBSjK8qpGM1GkTxlHnM",
    "ZLSYQ2abacxfFsUQHFcdQpmnPZAlCcGoljOJkmuR2vmciA0KKTkqmYIuKZmQ8tl4fuh7HiJZ5FrKMRQAA1giUmaby0GWLKdCGmlmVBb4ABe8RZCpgjGdl0WsBZtF",
    "RTJrCxSirEaOxYycdx0msPxgnkF5YlySZfVpoFCnxGFLgRVZOUMVGTG7vYjhjKlGVZf5aardQRWbUFZAxPQ40gAACggWQABJESRdUtYQjXqXR2FLTpLEOU5vW8QN",
    "nkiSNEljQtsmA1NBDQbBnpkmh9mdY5ggBjEBKUEQZCsRQ0OgPhJA/JCy1HHGgmUHpcoKtDsPsWSQA==",
);

/// 折线图第 2 版令牌改写为使用回引用字典的等价形态（4 处回引用）。
const LINE_CHART_V2_INTERNED: &str = concat!(
    "line-chart/2/EQUQLgxg9AqgKgYWAGgN7APYAdgC5gCGAdgCYqZYCmATsWbutnpgG40A2BOyFNdejHPmqUAZuSIEAtpWZgAljOABfHpQAeWEQGdt8jEQEU5iy",
    "gCViAc1k9sfUkabCxE6bPxSVPEgFdaCg2YABQBGABFybTBKIQBaEOVVYA0tSl19QwZjfAw2ak5uXloHLKdgEXEeSSV8CAALYiJKdi9kzR09QNKhYHZ5aNoWnhYC",
    "dh93dG1KMDgATypmAGU4MwBJADkAcXJmyhkiMG08AG1kwyqMSJZyEhtgUWpyCCOAXSSwefdgRZA4FUTkMd0CkOhkjABiPAAFiS2gw1DAAEEIAFMoJmHCETt2mlOm",
    "jsuUXFU3MxbuwwARWiR5CIUWD8LdtBBKKR5ERLK0+lJ+sjUY4elz+uQRmN3ABWAAMAOBOPSXXQkNwUp4ACMfBAANbTXn09H4BQyABC6q1YBufgIfPwQTgIQAEq1M",
    "Ui6fKCU7sak5fjFcrgNTaVbCEyWdT2f8XsgwNRxt5mhSUKcyfGeBAMD4DuQCCRbmQI6d6o1mq4ZNosARmeR5NozBgVRgzRG/XHKWg/aYiHjmAWiE0hsAReMjlkJc",
    "wiJceCEMdceABmZgPchQrtHHhi5gs/7IIg+djsVsYADuTUe+D6TViBaxsfJlO6zFyHC45DsxXoCrwvpBuN1BL6A1GwqjOMRhRAQWL4AATBKIRirEEoAJzxBBtoSk",
    "qqEShKAB0GESgAWjsJTAFBMFwYhITISEIRoWh2EYfh7yfMwcCrAAsiAAD6ZiIlsICbsAMgENofhfKm6ZmsoQA===",
);

fn instant(text: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(text)
        .unwrap()
        .with_timezone(&Utc)
}

fn duration(text: &str) -> Duration {
    Duration::parse(text).unwrap()
}

fn series_sort(reference: &str, direction: Direction) -> Sort {
    Sort {
        reference: reference.into(),
        kind: SortKind::Series {
            period: SeriesPeriod::Current,
        },
        direction,
    }
}

fn pinned_dimensions() -> Vec<String> {
    vec!["channel".into(), "namespace".into(), "isRobot".into()]
}

fn measures(names: &[&str]) -> Vec<Series> {
    names.iter().map(|name| Series::measure(*name)).collect()
}

fn string_clause(reference: &str, action: StringAction, values: &[&str]) -> FilterClause {
    FilterClause::String(StringClause {
        reference: reference.into(),
        action,
        values: values.iter().map(|value| value.to_string()).collect(),
        not: false,
    })
}

fn table_essence() -> Essence {
    let time_range = DateRange::new(
        instant("2015-09-12T00:00:00.000Z"),
        instant("2015-09-13T00:00:00.000Z"),
    )
    .unwrap();
    let filter = Filter::new(vec![
        FilterClause::FixedTime(FixedTimeClause {
            reference: "time".into(),
            values: vec![time_range],
        }),
        string_clause("channel", StringAction::In, &["en"]),
        FilterClause::Boolean(BooleanClause {
            reference: "isRobot".into(),
            values: vec![true],
            not: true,
        }),
        string_clause("page", StringAction::Contains, &["Jeremy"]),
        string_clause("userChars", StringAction::Match, &["^A$"]),
        FilterClause::Number(NumberClause {
            reference: "commentLength".into(),
            not: false,
            ranges: vec![NumberRange::new(Some(3.0), None, Bounds::ClosedOpen).unwrap()],
        }),
    ]);
    let split = |dimension: &str, kind, bucket, limit| {
        Split::new(dimension, kind, bucket, series_sort("delta", Direction::Descending), limit)
            .unwrap()
    };

    Essence {
        filter,
        splits: vec![
            split("channel", SplitKind::String, None, Some(50)),
            split("isRobot", SplitKind::String, None, Some(5)),
            split(
                "commentLength",
                SplitKind::Number,
                Some(Bucket::Number(10.0)),
                Some(5),
            ),
            split(
                "time",
                SplitKind::Time,
                Some(Bucket::Duration(duration("PT1H"))),
                None,
            ),
        ],
        series: measures(&["delta", "count", "added"]),
        pinned_dimensions: pinned_dimensions(),
        pinned_sort: "delta".into(),
        ..Essence::new(Visualization::Table)
    }
}

fn latest_day() -> FilterClause {
    FilterClause::RelativeTime(RelativeTimeClause {
        reference: "time".into(),
        period: TimePeriod::Latest,
        duration: duration("P1D"),
    })
}

fn hourly_time_split() -> Split {
    Split::new(
        "time",
        SplitKind::Time,
        Some(Bucket::Duration(duration("PT1H"))),
        Sort {
            reference: "time".into(),
            kind: SortKind::Dimension,
            direction: Direction::Ascending,
        },
        None,
    )
    .unwrap()
}

fn line_chart_essence() -> Essence {
    let legend = Legend {
        dimension: "channel".into(),
        limit: None,
        values: [(0, "no"), (1, "sv"), (3, "fr"), (4, "cs"), (5, "en")]
            .into_iter()
            .map(|(slot, value)| (slot, value.to_owned()))
            .collect(),
        has_null: false,
    };
    Essence {
        filter: Filter::new(vec![
            latest_day(),
            string_clause(
                "channel",
                StringAction::In,
                &["en", "no", "sv", "de", "fr", "cs"],
            ),
        ]),
        splits: vec![
            Split::new(
                "channel",
                SplitKind::String,
                None,
                series_sort("delta", Direction::Descending),
                Some(50),
            )
            .unwrap(),
            hourly_time_split(),
        ],
        series: measures(&["delta", "count", "added"]),
        pinned_dimensions: pinned_dimensions(),
        pinned_sort: "delta".into(),
        legend: Some(legend),
        ..Essence::new(Visualization::LineChart)
    }
}

fn no_slash_essence() -> Essence {
    Essence {
        filter: Filter::new(vec![latest_day()]),
        splits: vec![hourly_time_split()],
        series: measures(&["count"]),
        pinned_dimensions: pinned_dimensions(),
        pinned_sort: "delta".into(),
        ..Essence::new(Visualization::LineChart)
    }
}

#[test]
fn table_family_decodes_to_the_same_session() {
    let codec = StateCodec::new();
    let expected = table_essence();
    for token in [TABLE_V1, TABLE_V2, TABLE_V3, TABLE_V4] {
        assert_eq!(codec.decode(token).unwrap(), expected, "token {token}");
    }
}

#[test]
fn line_chart_family_decodes_to_the_same_session() {
    let codec = StateCodec::new();
    let expected = line_chart_essence();
    for token in [
        LINE_CHART_V2,
        LINE_CHART_V2_INTERNED,
        LINE_CHART_V3,
        LINE_CHART_V4,
    ] {
        assert_eq!(codec.decode(token).unwrap(), expected, "token {token}");
    }
}

#[test]
fn tokens_without_payload_slashes_decode() {
    let codec = StateCodec::new();
    let expected = no_slash_essence();
    assert_eq!(codec.decode(NO_SLASH_V2).unwrap(), expected);
    assert_eq!(codec.decode(NO_SLASH_V3).unwrap(), expected);
}

#[test]
fn current_tokens_are_reproduced_byte_for_byte() {
    let codec = StateCodec::new();
    assert_eq!(codec.encode(&table_essence()), TABLE_V4);
    assert_eq!(codec.encode(&line_chart_essence()), LINE_CHART_V4);
}

#[test]
fn legacy_tokens_upgrade_to_current_tokens() {
    let codec = StateCodec::new();
    let upgraded = codec.encode(&codec.decode(LINE_CHART_V2).unwrap());
    assert_eq!(upgraded, LINE_CHART_V4);
}

#[test]
fn unknown_versions_are_reported() {
    let codec = StateCodec::new();
    for token in ["99/xyz", "1/N4Ig", "0/N4Ig", "table/7/N4Ig", "4294967296/N4Ig"] {
        let err = codec.decode(token).unwrap_err();
        assert!(
            matches!(err, DecodeError::UnknownVersion { .. }),
            "{token}: {err:?}"
        );
        assert!(!err.is_malformed());
    }
}

fn v2_body(body: &str) -> String {
    format!("table/2/{}", lz::compress_to_base64(body))
}

#[test]
fn forward_back_reference_is_rejected() {
    let token = v2_body(
        r##""Etc/UTC",{"#":0},[{"expression":{"op":"ref","name":"time"}}],true,"count",["count"],[],"count",null,null,null"##,
    );
    let err = StateCodec::new().decode(&token).unwrap_err();
    assert_eq!(err, DecodeError::InvalidBackReference { index: 0, len: 0 });
    assert!(err.is_malformed());
}

#[test]
fn self_back_reference_is_rejected() {
    let token = v2_body(
        r##""Etc/UTC",{"op":"ref","name":"time"},[{"expression":{"#":1}}],true,"count",["count"],[],"count",null,null,null"##,
    );
    let err = StateCodec::new().decode(&token).unwrap_err();
    assert_eq!(err, DecodeError::InvalidBackReference { index: 1, len: 1 });
}

#[test]
fn corrupt_payloads_are_malformed() {
    let codec = StateCodec::new();
    let truncated = &TABLE_V4[..TABLE_V4.len() / 2];
    let cases = [
        "4/".to_owned(),
        "4/@@@@".to_owned(),
        truncated.to_owned(),
        format!("4/{}", lz::compress_to_base64("[1, 2, 3]")),
        format!("4/{}", lz::compress_to_base64("{\"visualization\":\"table\"")),
        format!(
            "4/{}",
            lz::compress_to_base64(
                r#"{"visualization":"pie","timezone":"Etc/UTC","filters":[],"splits":[],"series":[],"pinnedDimensions":[],"pinnedSort":"","legend":null}"#
            )
        ),
    ];
    for token in &cases {
        let err = codec.decode(token).unwrap_err();
        assert!(
            matches!(err, DecodeError::MalformedPayload { .. }),
            "{token}: {err:?}"
        );
    }
}

#[test]
fn inverted_time_range_is_malformed() {
    let definition = r#"{"visualization":"table","timezone":"Etc/UTC","filters":[{"type":"time","ref":"time","timeRanges":[{"start":"2015-09-13T00:00:00.000Z","end":"2015-09-12T00:00:00.000Z"}]}],"splits":[],"series":[],"pinnedDimensions":[],"pinnedSort":"","legend":null}"#;
    let token = format!("4/{}", lz::compress_to_base64(definition));
    let err = StateCodec::new().decode(&token).unwrap_err();
    assert!(matches!(err, DecodeError::MalformedPayload { .. }));
}

#[test]
fn unsupported_legacy_expression_fails_migration() {
    let token = v2_body(
        r#""Etc/UTC",{"op":"greaterThan","operand":{"op":"ref","name":"added"},"expression":{"op":"literal","value":3}},[],true,"count",["count"],[],"count",null,null,null"#,
    );
    let err = StateCodec::new().decode(&token).unwrap_err();
    assert!(
        matches!(err, DecodeError::MigrationFailed { from: 2, to: 3, .. }),
        "{err:?}"
    );
}
